use super::{
    normal_matrix, sample_texture, transform_normal, transform_position, Bindings, LightUniforms, Shader,
    ShaderError,
};
use crate::vertex::{Fragment, ShadedFragment, ShadedVertex, Varyings, Vertex};

/// Lighting is evaluated at the vertices and the resulting color is interpolated over the face.
#[derive(Debug, Default, Clone)]
pub struct GouraudShader<'a> {
    bindings: Bindings<'a>,
}

impl<'a> GouraudShader<'a> {
    pub fn new() -> Self {
        return Self::default();
    }
}

impl<'a> Shader<'a> for GouraudShader<'a> {
    fn bindings(&self) -> &Bindings<'a> {
        return &self.bindings;
    }

    fn bindings_mut(&mut self) -> &mut Bindings<'a> {
        return &mut self.bindings;
    }

    fn vertex(&self, vertex: &Vertex) -> Result<ShadedVertex, ShaderError> {
        let (world_pos, position) = transform_position(&self.bindings, vertex.position)?;
        let normal = transform_normal(&normal_matrix(&self.bindings)?, vertex.normal)?;
        let light = LightUniforms::read(&self.bindings)?;
        return Ok(ShadedVertex {
            position,
            varyings: Varyings {
                normal,
                uv: vertex.uv,
                color: light.ambient + light.diffuse * light.diffuse_coef(normal),
                world_pos,
            },
        });
    }

    fn fragment(&self, fragment: &Fragment) -> Result<ShadedFragment, ShaderError> {
        let albedo = sample_texture(&self.bindings, "diffuse", fragment.varyings.uv)?;
        let color = fragment.varyings.color.component_mul(&albedo);
        return Ok(ShadedFragment::from_fragment(fragment, color));
    }
}
