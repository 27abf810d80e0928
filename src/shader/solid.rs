use nalgebra as na;
use na::Vector3;

use super::{transform_position, Bindings, Shader, ShaderError};
use crate::vertex::{Fragment, ShadedFragment, ShadedVertex, Varyings, Vertex};

/// Fills every fragment with the "color" uniform. Handy for checking coverage and occlusion.
#[derive(Debug, Default, Clone)]
pub struct SolidShader<'a> {
    bindings: Bindings<'a>,
}

impl<'a> SolidShader<'a> {
    pub fn new() -> Self {
        return Self::default();
    }
}

impl<'a> Shader<'a> for SolidShader<'a> {
    fn bindings(&self) -> &Bindings<'a> {
        return &self.bindings;
    }

    fn bindings_mut(&mut self) -> &mut Bindings<'a> {
        return &mut self.bindings;
    }

    fn vertex(&self, vertex: &Vertex) -> Result<ShadedVertex, ShaderError> {
        let (world_pos, position) = transform_position(&self.bindings, vertex.position)?;
        return Ok(ShadedVertex {
            position,
            varyings: Varyings {
                uv: vertex.uv,
                world_pos,
                ..Default::default()
            },
        });
    }

    fn fragment(&self, fragment: &Fragment) -> Result<ShadedFragment, ShaderError> {
        let color = self.bindings.uniform::<Vector3<f32>>("color")?;
        return Ok(ShadedFragment::from_fragment(fragment, color));
    }
}
