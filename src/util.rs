use nalgebra as na;
use na::{vector, Vector3, Vector4};

/// Linear rgb color with channels nominally in [0.0, 1.0].
pub type Color = Vector3<f32>;

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a vector to homogenous coordinates.
/// w is zero, so translations don't affect it.
pub fn to_hom_vector(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 0.0];
}

/// Transformation of a point from homogenous coordinates, i.e. the perspective divide.
pub fn from_hom_point(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x / v.w, v.y / v.w, v.z / v.w];
}

/// Transformation of a vector from homogenous coordinates, dropping w.
pub fn from_hom_vector(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x, v.y, v.z];
}

/// Quantizes a float color into rgb8, clamping every channel.
pub fn color_to_rgb8(color: Color) -> [u8; 3] {
    fn channel(value: f32) -> u8 {
        // 255.999 so that exactly 1.0 still lands on 255.
        return (value.clamp(0.0, 1.0) * 255.999) as u8;
    }
    return [channel(color.x), channel(color.y), channel(color.z)];
}

/// Expands rgb8 into a float color.
pub fn color_from_rgb8(rgb: [u8; 3]) -> Color {
    return vector![rgb[0] as f32, rgb[1] as f32, rgb[2] as f32] / 255.0;
}

/// True if every component of the vector is finite (no NaN or infinities).
pub fn is_finite<const D: usize>(v: &na::SVector<f32, D>) -> bool {
    return v.iter().all(|c| c.is_finite());
}
