use nalgebra::{vector, Matrix4, Vector4};

use tiny_raster::pipeline::clip::clip_triangle;
use tiny_raster::{
    perspective, BindingError, Bindings, ClipMode, Color, FrameBuffer, Fragment, PhongShader, Pipeline,
    PipelineConfig, RenderError, Shader, ShaderError, ShadedFragment, ShadedVertex, SolidShader, Texture,
    Varyings, Vertex,
};

fn vertex(x: f32, y: f32, z: f32) -> Vertex {
    return Vertex { position: vector![x, y, z], ..Default::default() };
}

fn solid_shader<'a>(red: f32, green: f32, blue: f32) -> SolidShader<'a> {
    let mut shader = SolidShader::new();
    shader.set_uniform("model", Matrix4::<f32>::identity());
    shader.set_uniform("view", Matrix4::<f32>::identity());
    shader.set_uniform("projection", Matrix4::<f32>::identity());
    shader.set_uniform("color", vector![red, green, blue]);
    return shader;
}

/// Colors every fragment with its interpolated texture coordinate.
struct UvShader<'a> {
    bindings: Bindings<'a>,
}

impl<'a> Shader<'a> for UvShader<'a> {
    fn bindings(&self) -> &Bindings<'a> {
        return &self.bindings;
    }

    fn bindings_mut(&mut self) -> &mut Bindings<'a> {
        return &mut self.bindings;
    }

    fn vertex(&self, vertex: &Vertex) -> Result<ShadedVertex, ShaderError> {
        let projection = self.bindings.uniform::<Matrix4<f32>>("projection")?;
        let p = vertex.position;
        return Ok(ShadedVertex {
            position: projection * Vector4::new(p.x, p.y, p.z, 1.0),
            varyings: Varyings { uv: vertex.uv, ..Default::default() },
        });
    }

    fn fragment(&self, fragment: &Fragment) -> Result<ShadedFragment, ShaderError> {
        let uv = fragment.varyings.uv;
        return Ok(ShadedFragment::from_fragment(fragment, vector![uv.x, uv.y, 0.0]));
    }
}

#[test]
fn test_right_triangle_fills_lower_half() {
    // Lands on window (0, 0), (0, 200), (200, 200).
    let triangle = [vertex(-1.0, 1.0, 0.0), vertex(-1.0, -1.0, 0.0), vertex(1.0, -1.0, 0.0)];
    let mut frame = FrameBuffer::new(200, 200);
    let stats = Pipeline::default()
        .draw_triangles(&[triangle], &mut solid_shader(1.0, 0.0, 0.0), &mut frame)
        .unwrap();
    assert_eq!(stats.written, 20100);

    let mut red = 0;
    for y in 0..200 {
        for x in 0..200 {
            let is_red = frame.color.get(x, y) == vector![1.0, 0.0, 0.0];
            assert_eq!(is_red, x <= y, "pixel ({}, {})", x, y);
            if is_red {
                red += 1;
            }
        }
    }
    assert_eq!(red, 20100);
}

fn overlapping_pair() -> ([Vertex; 3], [Vertex; 3]) {
    // Larger z in NDC is farther away.
    let far = [vertex(-0.8, -0.8, 0.5), vertex(0.6, -0.8, 0.5), vertex(-0.8, 0.6, 0.5)];
    let near = [vertex(-0.6, -0.6, -0.5), vertex(0.8, -0.6, -0.5), vertex(-0.6, 0.8, -0.5)];
    return (far, near);
}

fn draw_pair(near_first: bool) -> FrameBuffer {
    let (far, near) = overlapping_pair();
    let pipeline = Pipeline::default();
    let mut frame = FrameBuffer::new(64, 64);
    let mut far_shader = solid_shader(0.0, 0.0, 1.0);
    let mut near_shader = solid_shader(0.0, 1.0, 0.0);
    if near_first {
        pipeline.draw_triangles(&[near], &mut near_shader, &mut frame).unwrap();
        pipeline.draw_triangles(&[far], &mut far_shader, &mut frame).unwrap();
    } else {
        pipeline.draw_triangles(&[far], &mut far_shader, &mut frame).unwrap();
        pipeline.draw_triangles(&[near], &mut near_shader, &mut frame).unwrap();
    }
    return frame;
}

#[test]
fn test_nearer_triangle_wins_in_either_order() {
    let near_first = draw_pair(true);
    let near_last = draw_pair(false);
    // Center of the overlap.
    for frame in [&near_first, &near_last] {
        assert_eq!(frame.color.get(28, 36), vector![0.0, 1.0, 0.0]);
        assert!((frame.depth.get(28, 36) - 0.75).abs() < 1e-6);
    }
    assert_eq!(near_first.color, near_last.color);
    assert_eq!(near_first.depth, near_last.depth);
}

#[test]
fn test_triangle_behind_the_eye_is_clipped_smoothly() {
    let projection = perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 10.0);
    let mut triangle = [vertex(-1.0, -1.0, -2.0), vertex(1.0, -1.0, -2.0), vertex(0.0, 1.0, 1.0)];
    triangle[1].uv = vector![1.0, 0.0];
    triangle[2].uv = vector![0.5, 1.0];

    let mut shader = UvShader { bindings: Bindings::new() };
    shader.set_uniform("projection", projection);

    // The vertex behind the eye turns the triangle into a quad, split in two.
    let shaded = [
        shader.vertex(&triangle[0]).unwrap(),
        shader.vertex(&triangle[1]).unwrap(),
        shader.vertex(&triangle[2]).unwrap(),
    ];
    assert!(shaded[2].position.w < 0.0);
    let parts = clip_triangle(&shaded, ClipMode::Near, 1e-5);
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().flatten().all(|v| v.position.w > 0.0));

    let config = PipelineConfig { cull_backfaces: false, ..Default::default() };
    let mut frame = FrameBuffer::new(200, 200);
    let stats = Pipeline::new(config).draw_triangles(&[triangle], &mut shader, &mut frame).unwrap();
    assert_eq!(stats.clipped, 0);
    assert_eq!(stats.skipped, 0);
    assert!(stats.written > 0);

    // No seam or jump between neighbouring pixels, including across the split.
    for y in 0..200 {
        for x in 0..199 {
            let (a, b) = (frame.depth.get(x, y), frame.depth.get(x + 1, y));
            if a == f32::MIN || b == f32::MIN {
                continue;
            }
            let (ca, cb) = (frame.color.get(x, y), frame.color.get(x + 1, y));
            assert!(ca.iter().all(|c| c.is_finite()));
            assert!((ca - cb).norm() < 0.1, "jump at ({}, {}): {:?} -> {:?}", x, y, ca, cb);
        }
    }
}

#[test]
fn test_triangle_entirely_behind_the_eye_draws_nothing() {
    let projection = perspective(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 10.0);
    let triangle = [vertex(-1.0, -1.0, 2.0), vertex(1.0, -1.0, 2.0), vertex(0.0, 1.0, 3.0)];
    let mut shader = UvShader { bindings: Bindings::new() };
    shader.set_uniform("projection", projection);
    let mut frame = FrameBuffer::new(50, 50);
    let stats = Pipeline::default().draw_triangles(&[triangle], &mut shader, &mut frame).unwrap();
    assert_eq!(stats.clipped, 1);
    assert_eq!(stats.written, 0);
}

#[test]
fn test_unset_uniform_aborts_render() {
    let triangle = [vertex(-1.0, 1.0, 0.0), vertex(-1.0, -1.0, 0.0), vertex(1.0, -1.0, 0.0)];
    let mut shader = SolidShader::new();
    shader.set_uniform("model", Matrix4::<f32>::identity());
    let mut frame = FrameBuffer::new(10, 10);
    let result = Pipeline::default().draw_triangles(&[triangle], &mut shader, &mut frame);
    assert_eq!(result, Err(RenderError::Binding(BindingError::MissingUniform("view".to_string()))));
    assert!(frame.depth.as_slice().iter().all(|z| *z == f32::MIN));
}

fn phong_shader<'a>(diffuse: &'a Texture, specular: &'a Texture) -> PhongShader<'a> {
    let mut shader = PhongShader::new();
    shader.set_uniform("model", Matrix4::<f32>::identity());
    shader.set_uniform("view", Matrix4::<f32>::identity());
    shader.set_uniform("projection", Matrix4::<f32>::identity());
    shader.set_uniform("light_dir", vector![0.0f32, 0.0, -1.0]);
    shader.set_uniform("light_ambient", vector![0.1f32, 0.1, 0.1]);
    shader.set_uniform("light_diffuse", vector![0.8f32, 0.8, 0.8]);
    shader.set_uniform("light_specular", vector![0.0f32, 0.0, 0.0]);
    shader.set_uniform("view_pos", vector![0.0f32, 0.0, 3.0]);
    shader.set_texture("diffuse", diffuse);
    shader.set_texture("specular", specular);
    return shader;
}

#[test]
fn test_positions_only_triangle_is_lit_with_its_face_normal() {
    let white = Texture::new(1, 1, Color::repeat(1.0));
    let triangle = [vertex(-0.5, -0.5, 0.0), vertex(0.5, -0.5, 0.0), vertex(0.0, 0.5, 0.0)];
    let mut frame = FrameBuffer::new(20, 20);
    let stats = Pipeline::default()
        .draw_triangles(&[triangle], &mut phong_shader(&white, &white), &mut frame)
        .unwrap();
    assert_eq!(stats.skipped, 0);
    assert!(stats.written > 0);
    // Face normal +z looks straight into the light.
    assert!((frame.color.get(10, 10) - Color::repeat(0.9)).norm() < 1e-5);
}

#[test]
fn test_empty_texture_skips_the_triangle() {
    let empty = Texture::new(0, 0, Color::repeat(1.0));
    let white = Texture::new(1, 1, Color::repeat(1.0));
    let mut triangle = [vertex(-0.5, -0.5, 0.0), vertex(0.5, -0.5, 0.0), vertex(0.0, 0.5, 0.0)];
    for v in triangle.iter_mut() {
        v.normal = vector![0.0, 0.0, 1.0];
    }
    let mut frame = FrameBuffer::new(20, 20);
    let stats = Pipeline::default()
        .draw_triangles(&[triangle], &mut phong_shader(&empty, &white), &mut frame)
        .unwrap();
    assert_eq!(stats.triangles, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.written, 0);
    assert!(frame.depth.as_slice().iter().all(|z| *z == f32::MIN));
}
