use nalgebra as na;
use na::{Matrix4, Vector3};

use crate::pipeline::transform::{look_at, perspective};
use crate::shader::Bindings;
use crate::util::Color;

/// Camera placed at `eye`, looking at `center`, with its view and projection matrices cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vector3<f32>,
    pub center: Vector3<f32>,
    pub up: Vector3<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl Camera {
    /// Perspective camera, `vfov` in radians, `near` and `far` as positive distances.
    pub fn new(
        eye: Vector3<f32>,
        center: Vector3<f32>,
        up: Vector3<f32>,
        vfov: f32,
        aspect: f32,
        near: f32,
        far: f32,
    ) -> Self {
        return Self {
            eye,
            center,
            up,
            view: look_at(eye, center, up),
            projection: perspective(vfov, aspect, near, far),
        };
    }

    /// Direction the camera looks in.
    pub fn direction(&self) -> Vector3<f32> {
        return (self.center - self.eye).normalize();
    }

    /// Publishes "view", "projection" and "view_pos".
    pub fn bind(&self, bindings: &mut Bindings) {
        bindings.set_uniform("view", self.view);
        bindings.set_uniform("projection", self.projection);
        bindings.set_uniform("view_pos", self.eye);
    }
}

/// Light infinitely far away, so it only has a direction. The direction points from the light into the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistantLight {
    pub direction: Vector3<f32>,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
}

impl DistantLight {
    /// White light with a dim ambient term.
    pub fn white(direction: Vector3<f32>) -> Self {
        return Self {
            direction,
            ambient: Color::repeat(0.1),
            diffuse: Color::repeat(0.8),
            specular: Color::repeat(0.5),
        };
    }

    /// Publishes "light_dir", "light_ambient", "light_diffuse" and "light_specular".
    pub fn bind(&self, bindings: &mut Bindings) {
        bindings.set_uniform("light_dir", self.direction);
        bindings.set_uniform("light_ambient", self.ambient);
        bindings.set_uniform("light_diffuse", self.diffuse);
        bindings.set_uniform("light_specular", self.specular);
    }
}
