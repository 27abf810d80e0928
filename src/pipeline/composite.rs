use crate::buffer::FrameBuffer;
use crate::vertex::ShadedFragment;

/// Depth test without writing anything: true if a fragment at depth `depth` would replace what is
/// stored at (x, y). Lets the pipeline skip fragment shading for occluded pixels.
pub fn depth_test(frame: &FrameBuffer, x: u32, y: u32, depth: f32) -> bool {
    if !frame.depth.contains(x as i64, y as i64) || depth.is_nan() {
        return false;
    }
    return depth > frame.depth.get(x, y);
}

/// Writes color and depth of the fragment if it is strictly closer than what is stored.
/// Returns whether the pixel was written. An equal depth keeps the stored value, so surfaces at
/// exactly the same depth resolve to whichever was drawn first.
pub fn composite(frame: &mut FrameBuffer, fragment: &ShadedFragment) -> bool {
    if !depth_test(frame, fragment.x, fragment.y, fragment.depth) {
        return false;
    }
    frame.depth.set(fragment.x, fragment.y, fragment.depth);
    frame.color.set(fragment.x, fragment.y, fragment.color);
    return true;
}
