use super::{transform_position, Bindings, Shader, ShaderError};
use crate::util::Color;
use crate::vertex::{Fragment, ShadedFragment, ShadedVertex, Varyings, Vertex};

/// Visualizes window depth as a gray level, white at the near plane.
#[derive(Debug, Default, Clone)]
pub struct DepthShader<'a> {
    bindings: Bindings<'a>,
}

impl<'a> DepthShader<'a> {
    pub fn new() -> Self {
        return Self::default();
    }
}

impl<'a> Shader<'a> for DepthShader<'a> {
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
            varyings: Varyings { world_pos, ..Default::default() },
        });
    }

    fn fragment(&self, fragment: &Fragment) -> Result<ShadedFragment, ShaderError> {
        let gray = fragment.depth.clamp(0.0, 1.0);
        return Ok(ShadedFragment::from_fragment(fragment, Color::repeat(gray)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    #[test]
    fn test_depth_becomes_gray() {
        let shader = DepthShader::new();
        let fragment = Fragment { x: 0, y: 0, depth: 0.25, varyings: Varyings::default() };
        assert_eq!(shader.fragment(&fragment).unwrap().color, vector![0.25, 0.25, 0.25]);
    }
}
