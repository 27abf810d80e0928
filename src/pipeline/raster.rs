//! Edge function rasterization of window space triangles.
//!
//! Pixel centers sit on integer coordinates. A pixel is covered if all three barycentric weights
//! are non-negative, so pixels exactly on an edge belong to every triangle sharing that edge.

use nalgebra as na;
use na::{Vector2, Vector3};

use crate::vertex::{Fragment, ScreenTriangle, Varyings};

/// Edge function of the directed edge a -> b at p: the z component of (b - a) x (p - a).
/// Positive if p is to the left of the edge.
pub fn edge_function(a: Vector2<f32>, b: Vector2<f32>, p: Vector2<f32>) -> f32 {
    return (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
}

fn screen_xy(triangle: &ScreenTriangle) -> [Vector2<f32>; 3] {
    return [
        triangle[0].position.xy(),
        triangle[1].position.xy(),
        triangle[2].position.xy(),
    ];
}

/// Twice the signed area of the triangle in window space.
pub fn signed_area(triangle: &ScreenTriangle) -> f32 {
    let [a, b, c] = screen_xy(triangle);
    return edge_function(a, b, c);
}

/// True if the triangle was clockwise in NDC, i.e. faces away from the camera.
/// Flipping y mirrors the window, which swaps the sign of the area.
pub fn is_back_facing(triangle: &ScreenTriangle, flip_y: bool) -> bool {
    let sign = if flip_y { -1.0 } else { 1.0 };
    return signed_area(triangle) * sign < 0.0;
}

/// Inclusive integer pixel range covered by a triangle, already clamped to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub ll: Vector2<u32>, // lower left corner
    pub ur: Vector2<u32>, // upper right corner
}

/// Bounding box of the triangle clamped to [0, width - 1] x [0, height - 1].
/// None if it lies entirely off the target.
pub fn bounding_box(triangle: &ScreenTriangle, width: u32, height: u32) -> Option<BoundingBox> {
    if width == 0 || height == 0 {
        return None;
    }
    let [a, b, c] = screen_xy(triangle);
    let min_x = a.x.min(b.x).min(c.x).floor();
    let min_y = a.y.min(b.y).min(c.y).floor();
    let max_x = a.x.max(b.x).max(c.x).ceil();
    let max_y = a.y.max(b.y).max(c.y).ceil();

    let x_limit = (width - 1) as f32;
    let y_limit = (height - 1) as f32;
    if max_x < 0.0 || max_y < 0.0 || min_x > x_limit || min_y > y_limit {
        return None;
    }
    return Some(BoundingBox {
        ll: Vector2::new(min_x.max(0.0) as u32, min_y.max(0.0) as u32),
        ur: Vector2::new(max_x.min(x_limit) as u32, max_y.min(y_limit) as u32),
    });
}

/// Barycentric weights of p, normalized by the signed area so they sum to 1 for either winding.
/// None for a degenerate triangle.
pub fn barycentric(triangle: &ScreenTriangle, p: Vector2<f32>) -> Option<Vector3<f32>> {
    let [a, b, c] = screen_xy(triangle);
    let area = edge_function(a, b, c);
    if area == 0.0 || !area.is_finite() {
        return None;
    }
    let weights = Vector3::new(
        edge_function(b, c, p),
        edge_function(c, a, p),
        edge_function(a, b, p),
    ) / area;
    return Some(weights);
}

/// Coverage test on barycentric weights, inclusive on edges.
pub fn is_inside(weights: &Vector3<f32>) -> bool {
    return weights.x >= 0.0 && weights.y >= 0.0 && weights.z >= 0.0;
}

/// Interpolates varyings with screen space weights corrected for perspective:
/// attributes over w and 1 / w are interpolated linearly, then divided.
/// Falls back to the plain weights if the 1 / w sum isn't positive.
pub fn perspective_correct(triangle: &ScreenTriangle, weights: Vector3<f32>) -> Varyings {
    let inv_w = Vector3::new(triangle[0].inv_w, triangle[1].inv_w, triangle[2].inv_w);
    let scaled = weights.component_mul(&inv_w);
    let denominator = scaled.sum();
    let corrected = if denominator > 0.0 { scaled / denominator } else { weights };
    let varyings = [triangle[0].varyings, triangle[1].varyings, triangle[2].varyings];
    return Varyings::weighted(varyings, corrected);
}

/// Walks the bounding box and hands every covered pixel to `emit` as a fragment.
/// Depth is interpolated linearly in window space, varyings perspective-correct.
/// Degenerate triangles produce no fragments. Stops at the first error returned by `emit`.
/// Returns the number of emitted fragments.
pub fn rasterize<E, F>(triangle: &ScreenTriangle, width: u32, height: u32, mut emit: F) -> Result<usize, E>
where
    F: FnMut(Fragment) -> Result<(), E>,
{
    let bbox = match bounding_box(triangle, width, height) {
        Some(bbox) => bbox,
        None => return Ok(0),
    };
    let depths = Vector3::new(triangle[0].position.z, triangle[1].position.z, triangle[2].position.z);

    let mut count = 0;
    for y in bbox.ll.y..=bbox.ur.y {
        for x in bbox.ll.x..=bbox.ur.x {
            let p = Vector2::new(x as f32, y as f32);
            let weights = match barycentric(triangle, p) {
                Some(weights) => weights,
                None => return Ok(0),
            };
            if !is_inside(&weights) {
                continue;
            }
            emit(Fragment {
                x,
                y,
                depth: weights.dot(&depths),
                varyings: perspective_correct(triangle, weights),
            })?;
            count += 1;
        }
    }
    return Ok(count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vertex::WindowVertex;
    use na::vector;

    fn window_vertex(x: f32, y: f32, inv_w: f32, u: f32) -> WindowVertex {
        return WindowVertex {
            position: vector![x, y, 0.5],
            inv_w,
            varyings: Varyings { uv: vector![u, 0.0], ..Default::default() },
        };
    }

    fn right_triangle() -> ScreenTriangle {
        return [
            window_vertex(0.0, 0.0, 1.0, 0.0),
            window_vertex(0.0, 200.0, 1.0, 0.0),
            window_vertex(200.0, 200.0, 1.0, 1.0),
        ];
    }

    #[test]
    fn test_weights_inside_sum_to_one() {
        let triangle = right_triangle();
        for p in [vector![1.0, 2.0], vector![50.0, 120.0], vector![10.0, 199.0]] {
            let weights = barycentric(&triangle, p).unwrap();
            assert!(is_inside(&weights), "{:?}", p);
            assert!((weights.sum() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_points_outside_have_a_negative_weight() {
        let triangle = right_triangle();
        for p in [vector![2.0, 1.0], vector![-1.0, 50.0], vector![100.0, 201.0]] {
            let weights = barycentric(&triangle, p).unwrap();
            assert!(!is_inside(&weights), "{:?}", p);
            assert!((weights.sum() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_weights_do_not_depend_on_winding() {
        let t = right_triangle();
        let reversed = [t[2], t[1], t[0]];
        let p = vector![20.0, 60.0];
        let w = barycentric(&t, p).unwrap();
        let w_reversed = barycentric(&reversed, p).unwrap();
        assert!((w.x - w_reversed.z).abs() < 1e-6);
        assert!((w.z - w_reversed.x).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_triangle_has_no_weights() {
        let line = [
            window_vertex(0.0, 0.0, 1.0, 0.0),
            window_vertex(5.0, 5.0, 1.0, 0.0),
            window_vertex(10.0, 10.0, 1.0, 0.0),
        ];
        assert_eq!(signed_area(&line), 0.0);
        assert!(barycentric(&line, vector![5.0, 5.0]).is_none());
        let emitted = rasterize::<(), _>(&line, 20, 20, |_| Ok(())).unwrap();
        assert_eq!(emitted, 0);
    }

    #[test]
    fn test_right_triangle_covers_lower_half() {
        let mut covered = Vec::new();
        let count = rasterize::<(), _>(&right_triangle(), 200, 200, |fragment| {
            covered.push((fragment.x, fragment.y));
            return Ok(());
        })
        .unwrap();
        assert_eq!(count, 20100);
        assert!(covered.iter().all(|(x, y)| x <= y));
    }

    #[test]
    fn test_bounding_box_clamps_to_target() {
        let triangle = [
            window_vertex(-10.5, 3.2, 1.0, 0.0),
            window_vertex(50.0, 3.2, 1.0, 0.0),
            window_vertex(5.0, 80.9, 1.0, 0.0),
        ];
        let bbox = bounding_box(&triangle, 40, 30).unwrap();
        assert_eq!(bbox.ll, vector![0, 3]);
        assert_eq!(bbox.ur, vector![39, 29]);

        let off_screen = [
            window_vertex(-30.0, 0.0, 1.0, 0.0),
            window_vertex(-20.0, 0.0, 1.0, 0.0),
            window_vertex(-25.0, 10.0, 1.0, 0.0),
        ];
        assert!(bounding_box(&off_screen, 40, 30).is_none());
    }

    #[test]
    fn test_back_facing_depends_on_flip() {
        // Counter-clockwise in a y-up window.
        let ccw = [
            window_vertex(0.0, 0.0, 1.0, 0.0),
            window_vertex(10.0, 0.0, 1.0, 0.0),
            window_vertex(0.0, 10.0, 1.0, 0.0),
        ];
        assert!(!is_back_facing(&ccw, false));
        assert!(is_back_facing(&ccw, true));
        let cw = [ccw[0], ccw[2], ccw[1]];
        assert!(is_back_facing(&cw, false));
        assert!(!is_back_facing(&cw, true));
    }

    #[test]
    fn test_constant_w_matches_linear_interpolation() {
        let triangle = [
            window_vertex(0.0, 0.0, 0.25, 0.0),
            window_vertex(10.0, 0.0, 0.25, 1.0),
            window_vertex(0.0, 10.0, 0.25, 0.5),
        ];
        let weights = vector![0.2, 0.3, 0.5];
        let corrected = perspective_correct(&triangle, weights);
        let linear = Varyings::weighted([triangle[0].varyings, triangle[1].varyings, triangle[2].varyings], weights);
        assert!((corrected.uv - linear.uv).norm() < 1e-6);
    }

    #[test]
    fn test_perspective_correction_pulls_towards_near_vertex() {
        // Vertex 0 is 4 times closer than vertex 1. Halfway on screen is much closer to vertex 0 in 3D.
        let triangle = [
            window_vertex(0.0, 0.0, 1.0, 0.0),
            window_vertex(10.0, 0.0, 0.25, 1.0),
            window_vertex(0.0, 10.0, 1.0, 0.0),
        ];
        let varyings = perspective_correct(&triangle, vector![0.5, 0.5, 0.0]);
        assert!((varyings.uv.x - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_emit_error_stops_rasterization() {
        let mut seen = 0;
        let result = rasterize(&right_triangle(), 200, 200, |_| {
            seen += 1;
            if seen == 3 {
                return Err("stop");
            }
            return Ok(());
        });
        assert_eq!(result, Err("stop"));
        assert_eq!(seen, 3);
    }
}
