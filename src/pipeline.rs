//! Fixed function part of the renderer, driving a shader over a mesh into a frame buffer.
//!
//! Per triangle: vertex shader on every corner, the shader's primitive hook, clipping in clip space,
//! perspective divide and viewport, degenerate and back-face rejection, rasterization, early depth
//! test, fragment shader and finally the depth tested write.

pub mod clip;
pub mod composite;
pub mod raster;
pub mod transform;

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use thiserror::Error;

use crate::buffer::FrameBuffer;
use crate::mesh::{fill_missing_normals, Mesh};
use crate::shader::{BindingError, Shader, ShaderError};
use crate::util::is_finite;
use crate::vertex::{ScreenTriangle, Triangle, Vertex};

use clip::{clip_triangle, ClipMode};
use composite::{composite, depth_test};
use raster::{is_back_facing, rasterize, signed_area};
use transform::{to_window, TexelSpace};

/// Switches of the fixed function stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    pub flip_y: bool,                    // Window y grows downwards, as image rows do.
    pub cull_backfaces: bool,            // Drop triangles that are clockwise in NDC.
    pub clip: ClipMode,
    pub near_epsilon: f32,               // Smallest clip w kept by the clipper.
    pub texel_space: Option<TexelSpace>, // Rescale uvs into texel coordinates before rasterization.
}

impl Default for PipelineConfig {
    fn default() -> Self {
        return Self {
            flip_y: true,
            cull_backfaces: true,
            clip: ClipMode::Near,
            near_epsilon: 1e-5,
            texel_space: None,
        };
    }
}

/// Counters collected over one draw call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub triangles: usize,  // Faces submitted.
    pub culled: usize,     // Back-facing, after clipping.
    pub clipped: usize,    // Entirely outside the clip volume.
    pub degenerate: usize, // Zero window area.
    pub skipped: usize,    // Bad indices or shader failures.
    pub fragments: usize,  // Covered pixels handed to the depth test.
    pub written: usize,    // Fragments that made it into the frame buffer.
    pub elapsed: Duration,
}

impl fmt::Display for RenderStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(
            f,
            "{} triangles ({} culled, {} clipped, {} degenerate, {} skipped), {} fragments, {} written in {:?}",
            self.triangles,
            self.culled,
            self.clipped,
            self.degenerate,
            self.skipped,
            self.fragments,
            self.written,
            self.elapsed,
        );
    }
}

/// Failure that stops a whole draw call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("render target is {width}x{height}, nothing can be drawn into it")]
    TargetSize { width: u32, height: u32 },
}

/// The fixed function pipeline. Holds no per-frame state, so one instance can draw any number of
/// meshes with any shaders into any frame buffers.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        return Self { config };
    }

    pub fn config(&self) -> &PipelineConfig {
        return &self.config;
    }

    /// Draws every face of the mesh. Faces with indices outside the attribute arrays are skipped.
    /// Textures bound to the shader must outlive the call, which the shader's lifetime enforces.
    pub fn draw_mesh<'a, S>(&self, mesh: &Mesh, shader: &mut S, frame: &mut FrameBuffer) -> Result<RenderStats, RenderError>
    where
        S: Shader<'a> + ?Sized,
    {
        let triangles = (0..mesh.face_count()).map(|face| mesh.triangle(face));
        return self.draw(triangles, shader, frame);
    }

    /// Draws a list of unindexed triangles.
    pub fn draw_triangles<'a, S>(
        &self,
        triangles: &[[Vertex; 3]],
        shader: &mut S,
        frame: &mut FrameBuffer,
    ) -> Result<RenderStats, RenderError>
    where
        S: Shader<'a> + ?Sized,
    {
        return self.draw(triangles.iter().copied().map(Some), shader, frame);
    }

    fn draw<'a, S, I>(&self, triangles: I, shader: &mut S, frame: &mut FrameBuffer) -> Result<RenderStats, RenderError>
    where
        S: Shader<'a> + ?Sized,
        I: Iterator<Item = Option<[Vertex; 3]>>,
    {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(RenderError::TargetSize {
                width: frame.width(),
                height: frame.height(),
            });
        }
        let time_begin = Instant::now();
        match shader.prepare() {
            Ok(()) => {}
            Err(ShaderError::Binding(error)) => return Err(error.into()),
            Err(error) => warn!("shader preparation failed: {}", error),
        }

        // Bindings are read-only from here on.
        let shader: &S = shader;
        let mut stats = RenderStats::default();
        for (index, vertices) in triangles.enumerate() {
            stats.triangles += 1;
            let mut vertices = match vertices {
                Some(vertices) => vertices,
                None => {
                    warn!("triangle {} references a missing vertex, skipping", index);
                    stats.skipped += 1;
                    continue;
                }
            };
            fill_missing_normals(&mut vertices);
            match self.process_triangle(&vertices, shader, frame, &mut stats) {
                Ok(()) => {}
                Err(ShaderError::Binding(error)) => return Err(error.into()),
                Err(error) => {
                    warn!("triangle {} skipped: {}", index, error);
                    stats.skipped += 1;
                }
            }
        }

        stats.elapsed = time_begin.elapsed();
        info!("rendered {}", stats);
        return Ok(stats);
    }

    /// Runs one triangle through every stage. Scratch state lives on the stack of this call.
    fn process_triangle<'a, S>(
        &self,
        vertices: &[Vertex; 3],
        shader: &S,
        frame: &mut FrameBuffer,
        stats: &mut RenderStats,
    ) -> Result<(), ShaderError>
    where
        S: Shader<'a> + ?Sized,
    {
        let mut triangle: Triangle = [
            shader.vertex(&vertices[0])?,
            shader.vertex(&vertices[1])?,
            shader.vertex(&vertices[2])?,
        ];
        shader.primitive(&mut triangle)?;

        let parts = clip_triangle(&triangle, self.config.clip, self.config.near_epsilon);
        if parts.is_empty() {
            debug!("triangle outside the clip volume");
            stats.clipped += 1;
            return Ok(());
        }

        let width = frame.width();
        let height = frame.height();
        for part in &parts {
            let screen = self.to_screen(part, width, height)?;
            let area = signed_area(&screen);
            if area == 0.0 || !area.is_finite() {
                debug!("degenerate triangle, area {}", area);
                stats.degenerate += 1;
                continue;
            }
            if self.config.cull_backfaces && is_back_facing(&screen, self.config.flip_y) {
                stats.culled += 1;
                continue;
            }

            // A fragment error ends the triangle, pixels it already wrote stay in the frame buffer.
            let written = &mut stats.written;
            let emitted = rasterize::<ShaderError, _>(&screen, width, height, |fragment| {
                if !depth_test(frame, fragment.x, fragment.y, fragment.depth) {
                    return Ok(());
                }
                let shaded = shader.fragment(&fragment)?;
                if !is_finite(&shaded.color) || !shaded.depth.is_finite() {
                    return Err(ShaderError::NonFinite("fragment output"));
                }
                if composite(frame, &shaded) {
                    *written += 1;
                }
                return Ok(());
            })?;
            stats.fragments += emitted;
        }
        return Ok(());
    }

    fn to_screen(&self, triangle: &Triangle, width: u32, height: u32) -> Result<ScreenTriangle, ShaderError> {
        let texel_space = self.config.texel_space.as_ref();
        let window = |i: usize| {
            return to_window(&triangle[i], width, height, self.config.flip_y, texel_space)
                .ok_or(ShaderError::NonFinite("window position"));
        };
        return Ok([window(0)?, window(1)?, window(2)?]);
    }
}
