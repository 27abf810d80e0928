use image::{GrayImage, Luma, Rgb, RgbImage};
use nalgebra as na;
use na::Vector2;

use crate::util::{color_from_rgb8, color_to_rgb8, Color};

/// Dense 2D grid of samples, holding its width, height and private flat array(vec) of data.
/// (0, 0) is the top left coordinate and the element at (x, y) lives at y * width + x.
#[derive(Debug, Clone, PartialEq)]
pub struct Buffer<T> {
    width: u32,
    height: u32,
    data: Vec<T>,
}

/// Read-only color grid bound to shaders by name.
pub type Texture = Buffer<Color>;

impl<T: Copy> Buffer<T> {
    /// Generates a buffer of the specified size with every element set to `fill`.
    pub fn new(width: u32, height: u32, fill: T) -> Self {
        return Self {
            width,
            height,
            data: vec![fill; width as usize * height as usize],
        };
    }

    /// Wraps already laid out row-major data. Returns None if the length doesn't match.
    pub fn from_vec(width: u32, height: u32, data: Vec<T>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        return Some(Self { width, height, data });
    }

    pub fn width(&self) -> u32 {
        return self.width;
    }

    pub fn height(&self) -> u32 {
        return self.height;
    }

    /// Checking if coordinate is in buffer bounds.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        return x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64;
    }

    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "({}, {}) out of bounds", x, y);
        return y as usize * self.width as usize + x as usize;
    }

    pub fn get(&self, x: u32, y: u32) -> T {
        return self.data[self.index(x, y)];
    }

    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let index = self.index(x, y);
        self.data[index] = value;
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: T) {
        for elem in &mut self.data {
            *elem = value;
        }
    }

    pub fn as_slice(&self) -> &[T] {
        return &self.data[..];
    }
}

impl Buffer<Color> {
    /// Converts an rgb8 image, e.g. a freshly loaded texture map.
    pub fn from_rgb_image(image: &RgbImage) -> Self {
        let data = image.pixels().map(|pixel| color_from_rgb8(pixel.0)).collect();
        return Self {
            width: image.width(),
            height: image.height(),
            data,
        };
    }

    /// Quantizes the grid into an rgb8 image.
    pub fn to_rgb_image(&self) -> RgbImage {
        return RgbImage::from_fn(self.width, self.height, |x, y| Rgb(color_to_rgb8(self.get(x, y))));
    }

    /// Nearest-neighbour lookup with normalized uv in [0, 1].
    /// Maps to (u * width, height - v * height) when `flip_v` is set, since texture images store
    /// their first row at the top while v grows upwards. Indices are truncated and clamped to the edge.
    /// None if the texture has no texels.
    pub fn sample(&self, uv: Vector2<f32>, flip_v: bool) -> Option<Color> {
        let w = self.width as f32;
        let h = self.height as f32;
        let y = if flip_v { h - uv.y * h } else { uv.y * h };
        return self.texel(Vector2::new(uv.x * w, y));
    }

    /// Lookup with coordinates already in texel space, truncated and clamped to the edge.
    pub fn texel(&self, coord: Vector2<f32>) -> Option<Color> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        // Float to int casts saturate and map NaN to 0, so the clamp is all we need.
        let x = (coord.x.max(0.0) as u32).min(self.width.saturating_sub(1));
        let y = (coord.y.max(0.0) as u32).min(self.height.saturating_sub(1));
        return Some(self.get(x, y));
    }
}

/// Render target: co-indexed color and depth grids of identical size.
/// Larger depth means closer to the camera, so depth starts out at f32::MIN.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pub color: Buffer<Color>,
    pub depth: Buffer<f32>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        return Self {
            color: Buffer::new(width, height, Color::zeros()),
            depth: Buffer::new(width, height, f32::MIN),
        };
    }

    pub fn width(&self) -> u32 {
        return self.color.width();
    }

    pub fn height(&self) -> u32 {
        return self.color.height();
    }

    /// Sets all colors to black and resets the depth grid.
    pub fn clear(&mut self) {
        self.color.fill(Color::zeros());
        self.depth.fill(f32::MIN);
    }

    /// Rendered colors as an rgb8 image.
    pub fn color_image(&self) -> RgbImage {
        return self.color.to_rgb_image();
    }

    /// Depth grid as a grayscale image, closest pixel white and farthest written pixel black.
    /// Pixels that were never written stay black.
    pub fn depth_image(&self) -> GrayImage {
        let written = || self.depth.as_slice().iter().filter(|z| **z != f32::MIN);
        let z_max = written().fold(f32::MIN, |max_value, z| z.max(max_value));
        let z_min = written().fold(f32::MAX, |min_value, z| z.min(min_value));
        let scale = if z_max > z_min { z_max - z_min } else { 1.0 };
        return GrayImage::from_fn(self.width(), self.height(), |x, y| {
            let z = self.depth.get(x, y);
            if z == f32::MIN {
                return Luma([0]);
            }
            let scaled_z = ((z - z_min) / scale).clamp(0.0, 1.0) * 255.0;
            return Luma([scaled_z as u8]);
        });
    }
}
