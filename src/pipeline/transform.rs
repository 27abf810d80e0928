//! Matrices of the standard transform chain and the fixed function clip -> window step.
//! Conventions are OpenGL's: right-handed, camera looking down -z, NDC in [-1, 1] on every axis.

use nalgebra as na;
use na::{matrix, Matrix4, Vector2, Vector3};

use crate::util::{from_hom_point, is_finite};
use crate::vertex::{ShadedVertex, WindowVertex};

/// View matrix of a camera at `eye` looking at `center`.
/// Builds an orthonormal basis around the camera and moves the camera to the origin.
pub fn look_at(eye: Vector3<f32>, center: Vector3<f32>, up: Vector3<f32>) -> Matrix4<f32> {
    // 'forward' axis, pointing backwards, since the camera faces -z.
    let z = (eye - center).normalize();
    let x = up.cross(&z).normalize();
    let y = z.cross(&x);
    let view_matrix = matrix![x.x, x.y, x.z, -x.dot(&eye);
                              y.x, y.y, y.z, -y.dot(&eye);
                              z.x, z.y, z.z, -z.dot(&eye);
                              0.0, 0.0, 0.0, 1.0];
    return view_matrix;
}

/// Perspective projection with vertical field of view `vfov` in radians.
/// `near` and `far` are positive distances in front of the camera.
pub fn perspective(vfov: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    let f = 1.0 / (0.5 * vfov).tan();
    let projection_matrix = matrix![f / aspect, 0.0, 0.0,                          0.0;
                                    0.0,        f,   0.0,                          0.0;
                                    0.0,        0.0, (far + near) / (near - far),  2.0 * far * near / (near - far);
                                    0.0,        0.0, -1.0,                         0.0];
    return projection_matrix;
}

/// Orthographic projection of the box [l, r] x [b, t] x [-near, -far] onto the canonical view volume.
pub fn orthographic(l: f32, r: f32, b: f32, t: f32, near: f32, far: f32) -> Matrix4<f32> {
    let projection_matrix = matrix![2.0 / (r - l), 0.0,           0.0,                 -(r + l) / (r - l);
                                    0.0,           2.0 / (t - b), 0.0,                 -(t + b) / (t - b);
                                    0.0,           0.0,           -2.0 / (far - near), -(far + near) / (far - near);
                                    0.0,           0.0,           0.0,                 1.0];
    return projection_matrix;
}

/// Maps NDC to window coordinates: x, y in [0, width] x [0, height] and depth in [0, 1].
/// With `flip_y` window y grows downwards, as rows of an image do.
/// Depth is 1 at the near plane and 0 at the far plane, so larger means closer.
pub fn viewport(ndc: Vector3<f32>, width: u32, height: u32, flip_y: bool) -> Vector3<f32> {
    let w = width as f32;
    let h = height as f32;
    let x = (ndc.x + 1.0) * 0.5 * w;
    let y = if flip_y {
        (1.0 - ndc.y) * 0.5 * h
    } else {
        (ndc.y + 1.0) * 0.5 * h
    };
    let depth = (1.0 - ndc.z) * 0.5;
    return Vector3::new(x, y, depth);
}

/// Rescales normalized texture coordinates into texel coordinates of a texture of the given size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TexelSpace {
    pub width: u32,
    pub height: u32,
    pub flip_v: bool, // Texture stores its first row at the top.
}

impl TexelSpace {
    pub fn apply(&self, uv: Vector2<f32>) -> Vector2<f32> {
        let w = self.width as f32;
        let h = self.height as f32;
        let v = if self.flip_v { h - uv.y * h } else { uv.y * h };
        return Vector2::new(uv.x * w, v);
    }
}

/// Perspective divide followed by the viewport transform.
/// Returns None if w isn't positive or the result isn't finite, so callers must clip first.
pub fn to_window(
    vertex: &ShadedVertex,
    width: u32,
    height: u32,
    flip_y: bool,
    texel_space: Option<&TexelSpace>,
) -> Option<WindowVertex> {
    let w = vertex.position.w;
    if !(w > 0.0) {
        return None;
    }
    let ndc = from_hom_point(vertex.position);
    let position = viewport(ndc, width, height, flip_y);
    if !is_finite(&position) {
        return None;
    }

    let mut varyings = vertex.varyings;
    if let Some(texel_space) = texel_space {
        varyings.uv = texel_space.apply(varyings.uv);
    }
    return Some(WindowVertex {
        position,
        inv_w: 1.0 / w,
        varyings,
    });
}
