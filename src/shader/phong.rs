use nalgebra as na;
use na::{Vector2, Vector3};

use super::{
    normal_matrix, sample_texture, transform_normal, transform_position, Bindings, LightUniforms, Shader,
    ShaderError,
};
use crate::util::Color;
use crate::vertex::{Fragment, ShadedFragment, ShadedVertex, Varyings, Vertex};

/// Ambient, diffuse and specular terms evaluated per fragment from the interpolated normal.
/// Reads the "diffuse" and "specular" textures and the "view_pos" uniform besides the light.
#[derive(Debug, Default, Clone)]
pub struct PhongShader<'a> {
    bindings: Bindings<'a>,
}

impl<'a> PhongShader<'a> {
    pub fn new() -> Self {
        return Self::default();
    }
}

/// Vertex stage shared by the per-fragment lighting shaders: world position and world normal
/// are passed on for interpolation.
pub(crate) fn lit_vertex(bindings: &Bindings, vertex: &Vertex) -> Result<ShadedVertex, ShaderError> {
    let (world_pos, position) = transform_position(bindings, vertex.position)?;
    let normal = transform_normal(&normal_matrix(bindings)?, vertex.normal)?;
    return Ok(ShadedVertex {
        position,
        varyings: Varyings {
            normal,
            uv: vertex.uv,
            world_pos,
            ..Default::default()
        },
    });
}

/// Phong reflectance of a surface point with unit normal `normal`.
pub(crate) fn phong_color(
    bindings: &Bindings,
    normal: Vector3<f32>,
    world_pos: Vector3<f32>,
    uv: Vector2<f32>,
) -> Result<Color, ShaderError> {
    let light = LightUniforms::read(bindings)?;
    let view_pos = bindings.uniform::<Vector3<f32>>("view_pos")?;
    let albedo = sample_texture(bindings, "diffuse", uv)?;
    let specular_map = sample_texture(bindings, "specular", uv)?;

    let ambient = light.ambient.component_mul(&albedo);
    let diffuse = light.diffuse.component_mul(&albedo) * light.diffuse_coef(normal);
    let specular = light.specular.component_mul(&specular_map) * light.specular_coef(normal, world_pos, view_pos);
    return Ok(ambient + diffuse + specular);
}

impl<'a> Shader<'a> for PhongShader<'a> {
    fn bindings(&self) -> &Bindings<'a> {
        return &self.bindings;
    }

    fn bindings_mut(&mut self) -> &mut Bindings<'a> {
        return &mut self.bindings;
    }

    fn vertex(&self, vertex: &Vertex) -> Result<ShadedVertex, ShaderError> {
        return lit_vertex(&self.bindings, vertex);
    }

    fn fragment(&self, fragment: &Fragment) -> Result<ShadedFragment, ShaderError> {
        // Interpolated normals are shorter than unit length between the vertices.
        let normal = fragment
            .varyings
            .normal
            .try_normalize(f32::EPSILON)
            .ok_or(ShaderError::NonFinite("fragment normal"))?;
        let color = phong_color(&self.bindings, normal, fragment.varyings.world_pos, fragment.varyings.uv)?;
        return Ok(ShadedFragment::from_fragment(fragment, color));
    }
}
