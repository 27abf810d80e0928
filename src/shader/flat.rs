use super::{sample_texture, transform_position, Bindings, LightUniforms, Shader, ShaderError};
use crate::vertex::{Fragment, ShadedFragment, ShadedVertex, Triangle, Varyings, Vertex};

/// One lighting value per face, computed from the face normal in world space.
/// Vertex normals from the mesh are ignored.
#[derive(Debug, Default, Clone)]
pub struct FlatShader<'a> {
    bindings: Bindings<'a>,
}

impl<'a> FlatShader<'a> {
    pub fn new() -> Self {
        return Self::default();
    }
}

impl<'a> Shader<'a> for FlatShader<'a> {
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

    fn primitive(&self, triangle: &mut Triangle) -> Result<(), ShaderError> {
        let [p0, p1, p2] = triangle.map(|v| v.varyings.world_pos);
        // Counter-clockwise winding, so the normal points towards the viewer of a front face.
        let face_normal = (p1 - p0)
            .cross(&(p2 - p0))
            .try_normalize(f32::EPSILON)
            .ok_or(ShaderError::NonFinite("face normal"))?;
        let light = LightUniforms::read(&self.bindings)?;
        let color = light.ambient + light.diffuse * light.diffuse_coef(face_normal);
        for vertex in triangle.iter_mut() {
            vertex.varyings.normal = face_normal;
            vertex.varyings.color = color;
        }
        return Ok(());
    }

    fn fragment(&self, fragment: &Fragment) -> Result<ShadedFragment, ShaderError> {
        let albedo = sample_texture(&self.bindings, "diffuse", fragment.varyings.uv)?;
        let color = fragment.varyings.color.component_mul(&albedo);
        return Ok(ShadedFragment::from_fragment(fragment, color));
    }
}
