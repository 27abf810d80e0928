use nalgebra as na;
use na::Matrix4;

use super::phong::{lit_vertex, phong_color};
use super::{normal_matrix, sample_texture, transform_normal, Bindings, Shader, ShaderError};
use crate::util::Color;
use crate::vertex::{Fragment, ShadedFragment, ShadedVertex, Vertex};

/// Phong lighting with the normal of every fragment taken from the "normal" texture.
/// The map stores object space normals, rgb in [0, 1] standing for xyz in [-1, 1].
#[derive(Debug, Default, Clone)]
pub struct NormalMapShader<'a> {
    bindings: Bindings<'a>,
    normal_matrix: Option<Matrix4<f32>>, // Cached in prepare, so it isn't inverted per fragment.
}

impl<'a> NormalMapShader<'a> {
    pub fn new() -> Self {
        return Self::default();
    }
}

impl<'a> Shader<'a> for NormalMapShader<'a> {
    fn bindings(&self) -> &Bindings<'a> {
        return &self.bindings;
    }

    fn bindings_mut(&mut self) -> &mut Bindings<'a> {
        // Uniforms may change, so the cached matrix can't be trusted anymore.
        self.normal_matrix = None;
        return &mut self.bindings;
    }

    fn prepare(&mut self) -> Result<(), ShaderError> {
        self.normal_matrix = match normal_matrix(&self.bindings) {
            Ok(matrix) => Some(matrix),
            // Singular model matrices fail per triangle in the vertex stage instead.
            Err(ShaderError::Binding(error)) => return Err(error.into()),
            Err(_) => None,
        };
        return Ok(());
    }

    fn vertex(&self, vertex: &Vertex) -> Result<ShadedVertex, ShaderError> {
        return lit_vertex(&self.bindings, vertex);
    }

    fn fragment(&self, fragment: &Fragment) -> Result<ShadedFragment, ShaderError> {
        let normal_matrix = match self.normal_matrix {
            Some(matrix) => matrix,
            None => normal_matrix(&self.bindings)?,
        };
        let encoded = sample_texture(&self.bindings, "normal", fragment.varyings.uv)?;
        let object_normal = encoded * 2.0 - Color::repeat(1.0);
        let normal = transform_normal(&normal_matrix, object_normal)?;
        let color = phong_color(&self.bindings, normal, fragment.varyings.world_pos, fragment.varyings.uv)?;
        return Ok(ShadedFragment::from_fragment(fragment, color));
    }
}
