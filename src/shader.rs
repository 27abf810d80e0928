//! Programmable stages of the pipeline and the uniform/texture binding store they read from.
//!
//! A shader is a pair of per-vertex and per-fragment functions, plus two optional hooks: `prepare`
//! runs once per draw before any vertex is processed, `primitive` runs once per assembled triangle.
//! Uniforms and textures are bound by name before a draw and only read while it runs.

mod depth;
mod flat;
mod gouraud;
mod normal_map;
mod phong;
mod solid;

pub use depth::DepthShader;
pub use flat::FlatShader;
pub use gouraud::GouraudShader;
pub use normal_map::NormalMapShader;
pub use phong::PhongShader;
pub use solid::SolidShader;

use std::collections::HashMap;

use nalgebra as na;
use na::{Matrix4, Vector2, Vector3, Vector4};
use thiserror::Error;

use crate::buffer::Texture;
use crate::util::{from_hom_point, from_hom_vector, is_finite, to_hom_point, to_hom_vector, Color};
use crate::vertex::{Fragment, ShadedFragment, ShadedVertex, Triangle, Vertex};

/// Shininess exponent of the specular term.
pub const SHININESS: f32 = 64.0;

/// A uniform was read that was never set, or under the wrong type, or a texture was never bound.
/// Signals a configuration mistake, so the pipeline aborts the whole render on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindingError {
    #[error("uniform `{0}` was never set")]
    MissingUniform(String),
    #[error("uniform `{name}` holds a {found}, requested a {requested}")]
    UniformType {
        name: String,
        requested: &'static str,
        found: &'static str,
    },
    #[error("texture `{0}` was never bound")]
    MissingTexture(String),
}

/// Failure of a shader stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("{0} matrix is not invertible")]
    Singular(&'static str),
    #[error("non-finite value in {0}")]
    NonFinite(&'static str),
    #[error("texture `{0}` has no texels")]
    EmptyTexture(String),
}

/// Tagged value of a uniform variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Scalar(f32),
    Vec2(Vector2<f32>),
    Vec3(Vector3<f32>),
    Vec4(Vector4<f32>),
    Mat4(Matrix4<f32>),
}

impl Uniform {
    /// Name of the stored type, used in error messages.
    pub fn kind(&self) -> &'static str {
        return match self {
            Uniform::Scalar(_) => "scalar",
            Uniform::Vec2(_) => "vec2",
            Uniform::Vec3(_) => "vec3",
            Uniform::Vec4(_) => "vec4",
            Uniform::Mat4(_) => "mat4",
        };
    }
}

/// Types that can be stored in and read back out of a [`Uniform`].
pub trait UniformValue: Sized + Into<Uniform> {
    const KIND: &'static str;

    /// Extracts the value if the tag matches, never converting between types.
    fn from_uniform(uniform: &Uniform) -> Option<Self>;
}

macro_rules! uniform_value {
    ($type:ty, $variant:ident, $kind:literal) => {
        impl From<$type> for Uniform {
            fn from(value: $type) -> Uniform {
                return Uniform::$variant(value);
            }
        }

        impl UniformValue for $type {
            const KIND: &'static str = $kind;

            fn from_uniform(uniform: &Uniform) -> Option<Self> {
                return match uniform {
                    Uniform::$variant(value) => Some(*value),
                    _ => None,
                };
            }
        }
    };
}

uniform_value!(f32, Scalar, "scalar");
uniform_value!(Vector2<f32>, Vec2, "vec2");
uniform_value!(Vector3<f32>, Vec3, "vec3");
uniform_value!(Vector4<f32>, Vec4, "vec4");
uniform_value!(Matrix4<f32>, Mat4, "mat4");

/// Named uniforms and borrowed textures, the shader equivalent of GPU uniforms and samplers.
///
/// Textures are borrowed for `'a`, so a texture has to outlive every render that uses the shader
/// it is bound to. Values are never cleared implicitly: a uniform set for one frame stays visible
/// in the next one unless it's overwritten or [`Bindings::clear`] is called.
#[derive(Debug, Default, Clone)]
pub struct Bindings<'a> {
    uniforms: HashMap<String, Uniform>,
    textures: HashMap<String, &'a Texture>,
}

impl<'a> Bindings<'a> {
    pub fn new() -> Self {
        return Self::default();
    }

    pub fn set_uniform<T: Into<Uniform>>(&mut self, name: &str, value: T) {
        self.uniforms.insert(name.to_string(), value.into());
    }

    /// Typed read of a uniform, failing if it's unset or holds another type.
    pub fn uniform<T: UniformValue>(&self, name: &str) -> Result<T, BindingError> {
        let uniform = self
            .uniforms
            .get(name)
            .ok_or_else(|| BindingError::MissingUniform(name.to_string()))?;
        return T::from_uniform(uniform).ok_or_else(|| BindingError::UniformType {
            name: name.to_string(),
            requested: T::KIND,
            found: uniform.kind(),
        });
    }

    pub fn set_texture(&mut self, name: &str, texture: &'a Texture) {
        self.textures.insert(name.to_string(), texture);
    }

    pub fn texture(&self, name: &str) -> Result<&'a Texture, BindingError> {
        return self
            .textures
            .get(name)
            .copied()
            .ok_or_else(|| BindingError::MissingTexture(name.to_string()));
    }

    /// Drops every uniform and texture binding.
    pub fn clear(&mut self) {
        self.uniforms.clear();
        self.textures.clear();
    }
}

/// Per-vertex and per-fragment computation with access to a binding store.
pub trait Shader<'a> {
    fn bindings(&self) -> &Bindings<'a>;

    fn bindings_mut(&mut self) -> &mut Bindings<'a>;

    /// Runs for each vertex. Must produce at least the clip space position.
    fn vertex(&self, vertex: &Vertex) -> Result<ShadedVertex, ShaderError>;

    /// Runs for each fragment rasterized from a triangle.
    fn fragment(&self, fragment: &Fragment) -> Result<ShadedFragment, ShaderError>;

    /// Runs once per draw, after all bindings are set and before any vertex is processed.
    /// Shaders may cache values derived from their uniforms here.
    fn prepare(&mut self) -> Result<(), ShaderError> {
        return Ok(());
    }

    /// Runs once per assembled clip space triangle, before clipping.
    fn primitive(&self, _triangle: &mut Triangle) -> Result<(), ShaderError> {
        return Ok(());
    }

    fn set_uniform<T: Into<Uniform>>(&mut self, name: &str, value: T)
    where
        Self: Sized,
    {
        self.bindings_mut().set_uniform(name, value);
    }

    fn uniform<T: UniformValue>(&self, name: &str) -> Result<T, BindingError>
    where
        Self: Sized,
    {
        return self.bindings().uniform(name);
    }

    fn set_texture(&mut self, name: &str, texture: &'a Texture) {
        self.bindings_mut().set_texture(name, texture);
    }

    fn texture(&self, name: &str) -> Result<&'a Texture, BindingError> {
        return self.bindings().texture(name);
    }
}

/// Position of a vertex in world space and in clip space, from the "model", "view" and
/// "projection" uniforms.
pub(crate) fn transform_position(
    bindings: &Bindings,
    position: Vector3<f32>,
) -> Result<(Vector3<f32>, Vector4<f32>), ShaderError> {
    let model = bindings.uniform::<Matrix4<f32>>("model")?;
    let view = bindings.uniform::<Matrix4<f32>>("view")?;
    let projection = bindings.uniform::<Matrix4<f32>>("projection")?;

    let world = model * to_hom_point(position);
    let clip = projection * view * world;
    if !is_finite(&clip) {
        return Err(ShaderError::NonFinite("clip position"));
    }
    return Ok((from_hom_point(world), clip));
}

/// Inverse transpose of the "model" uniform. Normals transform with it, so that they stay
/// perpendicular to surfaces under non-uniform scale.
pub(crate) fn normal_matrix(bindings: &Bindings) -> Result<Matrix4<f32>, ShaderError> {
    let model = bindings.uniform::<Matrix4<f32>>("model")?;
    let inverse = model.try_inverse().ok_or(ShaderError::Singular("model"))?;
    if !inverse.iter().all(|c| c.is_finite()) {
        return Err(ShaderError::NonFinite("normal matrix"));
    }
    return Ok(inverse.transpose());
}

/// Applies the normal matrix to an object space normal and normalizes the result.
pub(crate) fn transform_normal(
    normal_matrix: &Matrix4<f32>,
    normal: Vector3<f32>,
) -> Result<Vector3<f32>, ShaderError> {
    let world_normal = from_hom_vector(normal_matrix * to_hom_vector(normal));
    let world_normal = world_normal
        .try_normalize(f32::EPSILON)
        .ok_or(ShaderError::NonFinite("world normal"))?;
    return Ok(world_normal);
}

/// Nearest-neighbour lookup of a bound texture with normalized uv, stored top row first.
/// An unbound texture is a binding error, a bound but empty one only fails the current triangle.
pub(crate) fn sample_texture(bindings: &Bindings, name: &str, uv: Vector2<f32>) -> Result<Color, ShaderError> {
    return bindings
        .texture(name)?
        .sample(uv, true)
        .ok_or_else(|| ShaderError::EmptyTexture(name.to_string()));
}

/// Light colors of the distant light, read from the standard uniforms.
pub(crate) struct LightUniforms {
    pub direction: Vector3<f32>,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
}

impl LightUniforms {
    pub(crate) fn read(bindings: &Bindings) -> Result<Self, BindingError> {
        return Ok(Self {
            direction: bindings.uniform::<Vector3<f32>>("light_dir")?.normalize(),
            ambient: bindings.uniform("light_ambient")?,
            diffuse: bindings.uniform("light_diffuse")?,
            specular: bindings.uniform("light_specular")?,
        });
    }

    /// Lambert coefficient. The light direction points from the light into the scene.
    pub(crate) fn diffuse_coef(&self, normal: Vector3<f32>) -> f32 {
        return normal.dot(&-self.direction).max(0.0);
    }

    /// Phong specular coefficient for a surface point seen from `view_pos`.
    pub(crate) fn specular_coef(
        &self,
        normal: Vector3<f32>,
        world_pos: Vector3<f32>,
        view_pos: Vector3<f32>,
    ) -> f32 {
        let view_dir = (view_pos - world_pos).try_normalize(f32::EPSILON);
        let reflected = self.direction - 2.0 * normal.dot(&self.direction) * normal;
        return match view_dir {
            Some(view_dir) => view_dir.dot(&reflected).max(0.0).powf(SHININESS),
            None => 0.0,
        };
    }
}
