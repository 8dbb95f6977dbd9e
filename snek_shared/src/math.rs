//! Math and color types.
//!
//! Kept small: the frontend only needs positions and colors that a renderer
//! can consume directly.

use serde::{Deserialize, Serialize};

/// 3D vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Widens three wire magnitudes. Values above 2^24 lose precision.
    pub fn from_magnitudes([x, y, z]: [u64; 3]) -> Self {
        Self::new(x as f32, y as f32, z as f32)
    }

    /// True if every component is within `0..=bounds` on its axis.
    pub fn within(self, bounds: Vec3) -> bool {
        (0.0..=bounds.x).contains(&self.x)
            && (0.0..=bounds.y).contains(&self.y)
            && (0.0..=bounds.z).contains(&self.z)
    }
}

/// RGBA color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::opaque(1.0, 1.0, 1.0);

    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Maps wire bytes `0..=255` to `0.0..=1.0`; alpha is always 1.
    pub fn from_rgb8([r, g, b]: [u8; 3]) -> Self {
        Self::opaque(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// Inverse of [`Color::from_rgb8`], rounding to the nearest byte.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    pub fn as_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One rendered cell of the snake or the food.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub position: Vec3,
    pub color: Color,
}

impl Point {
    pub const fn new(position: Vec3, color: Color) -> Self {
        Self { position, color }
    }
}
