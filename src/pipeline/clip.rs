//! Clipping of clip space triangles against the planes of the view volume.
//! Works on homogeneous coordinates before the perspective divide, so triangles crossing
//! the plane of the eye come out with strictly positive w.

use nalgebra as na;
use na::Vector4;

use crate::vertex::{ShadedVertex, Triangle, Varyings};

/// Which planes a triangle is clipped against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClipMode {
    /// Only the w > epsilon plane. Geometry outside the side planes is left to the bounding box clamp.
    #[default]
    Near,
    /// w > epsilon plus the six planes of the canonical view volume.
    Frustum,
}

#[derive(Debug, Clone, Copy)]
enum Plane {
    W,
    Near,
    Far,
    Left,
    Right,
    Bottom,
    Top,
}

const NEAR_PLANES: [Plane; 1] = [Plane::W];
const FRUSTUM_PLANES: [Plane; 7] = [
    Plane::W,
    Plane::Near,
    Plane::Far,
    Plane::Left,
    Plane::Right,
    Plane::Bottom,
    Plane::Top,
];

impl Plane {
    /// Signed distance, non-negative on the inner side.
    fn distance(&self, p: &Vector4<f32>, epsilon: f32) -> f32 {
        return match self {
            Plane::W => p.w - epsilon,
            Plane::Near => p.z + p.w,
            Plane::Far => p.w - p.z,
            Plane::Left => p.x + p.w,
            Plane::Right => p.w - p.x,
            Plane::Bottom => p.y + p.w,
            Plane::Top => p.w - p.y,
        };
    }
}

impl ClipMode {
    fn planes(&self) -> &'static [Plane] {
        return match self {
            ClipMode::Near => &NEAR_PLANES,
            ClipMode::Frustum => &FRUSTUM_PLANES,
        };
    }
}

/// Vertex on the segment a -> b at parameter t. Position and varyings share the same t.
fn lerp_vertex(a: &ShadedVertex, b: &ShadedVertex, t: f32) -> ShadedVertex {
    return ShadedVertex {
        position: a.position + (b.position - a.position) * t,
        varyings: Varyings::lerp(a.varyings, b.varyings, t),
    };
}

/// One Sutherland-Hodgman pass of a convex polygon against a single plane.
fn clip_polygon(polygon: &[ShadedVertex], plane: Plane, epsilon: f32) -> Vec<ShadedVertex> {
    let mut result = Vec::with_capacity(polygon.len() + 1);
    for i in 0..polygon.len() {
        let current = &polygon[i];
        let next = &polygon[(i + 1) % polygon.len()];
        let dc = plane.distance(&current.position, epsilon);
        let dn = plane.distance(&next.position, epsilon);

        if dc >= 0.0 {
            result.push(*current);
        }
        // Vertices exactly on the plane are kept as they are, only strict crossings add one.
        if (dc > 0.0 && dn < 0.0) || (dc < 0.0 && dn > 0.0) {
            result.push(lerp_vertex(current, next, dc / (dc - dn)));
        }
    }
    return result;
}

/// Clips a triangle and re-triangulates the remaining convex polygon as a fan around its first vertex.
/// Returns the input unchanged if it is entirely inside, and nothing if it is entirely outside.
/// Vertex order, hence winding, is preserved.
pub fn clip_triangle(triangle: &Triangle, mode: ClipMode, epsilon: f32) -> Vec<Triangle> {
    let planes = mode.planes();
    let inside = |v: &ShadedVertex| planes.iter().all(|plane| plane.distance(&v.position, epsilon) >= 0.0);
    if triangle.iter().all(inside) {
        return vec![*triangle];
    }

    let mut polygon = triangle.to_vec();
    for plane in planes {
        polygon = clip_polygon(&polygon, *plane, epsilon);
        if polygon.len() < 3 {
            return Vec::new();
        }
    }

    let triangles = (1..polygon.len() - 1)
        .map(|i| [polygon[0], polygon[i], polygon[i + 1]])
        .collect();
    return triangles;
}
