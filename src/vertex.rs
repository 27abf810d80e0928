use std::ops::{Add, Mul};

use nalgebra as na;
use na::{Vector2, Vector3, Vector4};

use crate::util::Color;

/// Object space attributes of a mesh vertex, the input of a vertex shader.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub uv: Vector2<f32>,
}

/// Per-vertex values handed from the vertex shader to the fragment shader.
/// Everything here gets interpolated across the triangle, perspective-correct.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Varyings {
    pub normal: Vector3<f32>,    // World space normal.
    pub uv: Vector2<f32>,        // Texture coordinate, normalized or in texel space.
    pub color: Color,            // Per-vertex color, e.g. Gouraud lighting.
    pub world_pos: Vector3<f32>, // World space position, needed for specular terms.
}

impl Add for Varyings {
    type Output = Varyings;

    fn add(self, rhs: Varyings) -> Varyings {
        return Varyings {
            normal: self.normal + rhs.normal,
            uv: self.uv + rhs.uv,
            color: self.color + rhs.color,
            world_pos: self.world_pos + rhs.world_pos,
        };
    }
}

impl Mul<f32> for Varyings {
    type Output = Varyings;

    fn mul(self, rhs: f32) -> Varyings {
        return Varyings {
            normal: self.normal * rhs,
            uv: self.uv * rhs,
            color: self.color * rhs,
            world_pos: self.world_pos * rhs,
        };
    }
}

impl Varyings {
    /// a + t * (b - a).
    pub fn lerp(a: Varyings, b: Varyings, t: f32) -> Varyings {
        return a * (1.0 - t) + b * t;
    }

    /// Weighted sum of three varyings, weights usually being barycentric coordinates.
    pub fn weighted(v: [Varyings; 3], weights: Vector3<f32>) -> Varyings {
        return v[0] * weights[0] + v[1] * weights[1] + v[2] * weights[2];
    }
}

/// Output of a vertex shader. The clip space position still carries its w.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShadedVertex {
    pub position: Vector4<f32>,
    pub varyings: Varyings,
}

/// Primitive in clip space, counter-clockwise when facing the camera.
pub type Triangle = [ShadedVertex; 3];

/// Vertex after perspective divide and viewport transform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WindowVertex {
    pub position: Vector3<f32>, // x, y in pixels, z is window depth.
    pub inv_w: f32,             // 1 / clip w, for perspective-correct interpolation.
    pub varyings: Varyings,
}

/// Primitive in window space, ready for rasterization.
pub type ScreenTriangle = [WindowVertex; 3];

/// One rasterized sample of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment {
    pub x: u32,
    pub y: u32,
    pub depth: f32,
    pub varyings: Varyings,
}

/// Output of a fragment shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedFragment {
    pub x: u32,
    pub y: u32,
    pub depth: f32,
    pub color: Color,
}

impl ShadedFragment {
    /// Keeps window position and depth of the fragment, attaching the final color.
    pub fn from_fragment(fragment: &Fragment, color: Color) -> Self {
        return Self {
            x: fragment.x,
            y: fragment.y,
            depth: fragment.depth,
            color,
        };
    }
}
