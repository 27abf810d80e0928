use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use log::{info, warn};
use nalgebra as na;
use na::{vector, Matrix4, Vector3};
use obj::{load_obj, Obj, Position, TexturedVertex};

use tiny_raster::{
    Camera, Color, DepthShader, DistantLight, FlatShader, FrameBuffer, GouraudShader, Mesh, NormalMapShader,
    PhongShader, Pipeline, PipelineConfig, Shader, SolidShader, Texture, Vertex,
};

/// Shading models selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShaderKind {
    Solid,
    Flat,
    Gouraud,
    Phong,
    NormalMap,
    Depth,
}

pub struct Params {
    pub width: u32,
    pub height: u32,
    pub model_path: PathBuf,
    pub diffuse_path: Option<PathBuf>,
    pub specular_path: Option<PathBuf>,
    pub normal_path: Option<PathBuf>,
    pub shader: ShaderKind,
    pub output_path: PathBuf,
    pub depth_output_path: Option<PathBuf>,
    pub eye: Vector3<f32>,
    pub light_direction: Vector3<f32>,
    pub cull_backfaces: bool,
}

/// Three command line floats as a vector.
pub fn vector_arg(values: &[f32]) -> Result<Vector3<f32>, Box<dyn Error>> {
    return match values {
        [x, y, z] => Ok(vector![*x, *y, *z]),
        _ => Err(format!("expected 3 components, got {}", values.len()).into()),
    };
}

/// Builds a mesh out of an OBJ file. Models without texture coordinates or normals are accepted,
/// the missing attributes read as zero and the pipeline lights such faces with their face normal.
fn load_mesh(path: &Path) -> Result<Mesh, Box<dyn Error>> {
    let data = fs::read(path)?;
    let mut mesh = Mesh::new();
    match load_obj::<TexturedVertex, _, u32>(&data[..]) {
        Ok(model) => {
            for v in &model.vertices {
                mesh.push_vertex(Vertex {
                    position: Vector3::from(v.position),
                    normal: Vector3::from(v.normal),
                    uv: vector![v.texture[0], v.texture[1]],
                });
            }
            push_faces(&mut mesh, &model.indices);
        }
        Err(error) => {
            warn!("{} has no full vertex attributes ({}), loading positions only", path.display(), error);
            let model: Obj<Position, u32> = load_obj(&data[..])?;
            for v in &model.vertices {
                mesh.push_vertex(Vertex {
                    position: Vector3::from(v.position),
                    ..Default::default()
                });
            }
            push_faces(&mut mesh, &model.indices);
        }
    }
    info!("Number of vertices - {}", mesh.vertex_count());
    info!("Number of faces    - {}", mesh.face_count());
    return Ok(mesh);
}

fn push_faces(mesh: &mut Mesh, indices: &[u32]) {
    for face in indices.chunks_exact(3) {
        mesh.push_face([face[0] as usize, face[1] as usize, face[2] as usize]);
    }
}

/// Loads a texture map, or makes a 1x1 texture of `fallback` if no path was given.
fn load_texture(path: Option<&PathBuf>, fallback: Color, name: &str) -> Result<Texture, Box<dyn Error>> {
    return match path {
        Some(path) => {
            let image = image::open(path)?.to_rgb8();
            info!("{} texture {} - {}x{}", name, path.display(), image.width(), image.height());
            Ok(Texture::from_rgb_image(&image))
        }
        None => Ok(Texture::new(1, 1, fallback)),
    };
}

/// Instantiates the requested shading model.
fn make_shader<'a>(kind: ShaderKind) -> Box<dyn Shader<'a> + 'a> {
    return match kind {
        ShaderKind::Solid => Box::new(SolidShader::new()),
        ShaderKind::Flat => Box::new(FlatShader::new()),
        ShaderKind::Gouraud => Box::new(GouraudShader::new()),
        ShaderKind::Phong => Box::new(PhongShader::new()),
        ShaderKind::NormalMap => Box::new(NormalMapShader::new()),
        ShaderKind::Depth => Box::new(DepthShader::new()),
    };
}

/// Renders one frame of the model and writes the color grid, plus the depth grid if requested.
pub fn run(params: Params) -> Result<(), Box<dyn Error>> {
    let mesh = load_mesh(&params.model_path)?;
    let diffuse = load_texture(params.diffuse_path.as_ref(), Color::repeat(1.0), "diffuse")?;
    let specular = load_texture(params.specular_path.as_ref(), Color::zeros(), "specular")?;
    // Flat normal map: every texel decodes to +z.
    let normal = load_texture(params.normal_path.as_ref(), vector![0.5, 0.5, 1.0], "normal")?;

    let aspect = params.width as f32 / params.height.max(1) as f32;
    let camera = Camera::new(
        params.eye,
        Vector3::zeros(),
        vector![0.0, 1.0, 0.0],
        std::f32::consts::FRAC_PI_3,
        aspect,
        0.1,
        100.0,
    );
    let light = DistantLight::white(params.light_direction);

    let mut shader = make_shader(params.shader);
    {
        let bindings = shader.bindings_mut();
        bindings.set_uniform("model", Matrix4::<f32>::identity());
        bindings.set_uniform("color", Color::repeat(1.0));
        camera.bind(bindings);
        light.bind(bindings);
        bindings.set_texture("diffuse", &diffuse);
        bindings.set_texture("specular", &specular);
        bindings.set_texture("normal", &normal);
    }

    let config = PipelineConfig {
        cull_backfaces: params.cull_backfaces,
        ..Default::default()
    };
    let pipeline = Pipeline::new(config);
    let mut frame = FrameBuffer::new(params.width, params.height);
    info!("Rendering with {:?} shader at {}x{}", params.shader, params.width, params.height);
    let stats = pipeline.draw_mesh(&mesh, shader.as_mut(), &mut frame)?;
    if stats.skipped > 0 {
        warn!("{} triangles were skipped", stats.skipped);
    }

    frame.color_image().save(&params.output_path)?;
    info!("Wrote {}", params.output_path.display());
    if let Some(depth_path) = &params.depth_output_path {
        frame.depth_image().save(depth_path)?;
        info!("Wrote {}", depth_path.display());
    }

    return Ok(());
}
