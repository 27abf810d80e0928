//! Software triangle rasterizer: programmable vertex and fragment shaders over a fixed function
//! pipeline of clipping, perspective divide, edge function coverage, perspective-correct
//! interpolation and a depth tested frame buffer.

pub mod buffer;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod shader;
pub mod util;
pub mod vertex;

pub use buffer::{Buffer, FrameBuffer, Texture};
pub use mesh::Mesh;
pub use pipeline::clip::ClipMode;
pub use pipeline::transform::{look_at, orthographic, perspective, TexelSpace};
pub use pipeline::{Pipeline, PipelineConfig, RenderError, RenderStats};
pub use scene::{Camera, DistantLight};
pub use shader::{
    BindingError, Bindings, DepthShader, FlatShader, GouraudShader, NormalMapShader, PhongShader, Shader,
    ShaderError, SolidShader, Uniform, UniformValue,
};
pub use util::Color;
pub use vertex::{Fragment, ShadedFragment, ShadedVertex, Varyings, Vertex};
