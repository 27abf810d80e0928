mod app;

use std::path::PathBuf;

use clap::Parser;

/// Renders an OBJ model into a PNG with a software rasterizer.
#[derive(Parser, Debug)]
#[command(name = "tiny_raster", version)]
struct Args {
    /// Path to the OBJ model.
    #[arg(short, long, default_value = "assets/diablo/model.obj")]
    model: PathBuf,

    /// Diffuse texture map.
    #[arg(long)]
    diffuse: Option<PathBuf>,

    /// Specular texture map.
    #[arg(long)]
    specular: Option<PathBuf>,

    /// Tangent-free normal map, in world space.
    #[arg(long)]
    normal: Option<PathBuf>,

    /// Shading model.
    #[arg(short, long, value_enum, default_value_t = app::ShaderKind::Phong)]
    shader: app::ShaderKind,

    /// Output image of the color grid.
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,

    /// Output image of the depth grid.
    #[arg(long)]
    depth_output: Option<PathBuf>,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Camera position, looking at the origin.
    #[arg(long, num_args = 3, allow_negative_numbers = true, default_values_t = [1.0, 1.0, 3.0])]
    eye: Vec<f32>,

    /// Light direction, pointing from the light into the scene.
    #[arg(long, num_args = 3, allow_negative_numbers = true, default_values_t = [-1.0, -1.0, -1.0])]
    light: Vec<f32>,

    /// Keep back-facing triangles.
    #[arg(long)]
    no_cull: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp_millis()
        .init();

    let params = app::Params {
        width: args.width,
        height: args.height,
        model_path: args.model,
        diffuse_path: args.diffuse,
        specular_path: args.specular,
        normal_path: args.normal,
        shader: args.shader,
        output_path: args.output,
        depth_output_path: args.depth_output,
        eye: app::vector_arg(&args.eye)?,
        light_direction: app::vector_arg(&args.light)?,
        cull_backfaces: !args.no_cull,
    };

    app::run(params)?;

    return Ok(());
}
