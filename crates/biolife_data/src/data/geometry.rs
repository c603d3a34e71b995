use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world units, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Bounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    #[must_use]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    #[inline]
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    #[inline]
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.left, self.top)
    }

    #[inline]
    #[must_use]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Shrinks the rectangle by `margin` on every side.
    #[must_use]
    pub fn inset(&self, margin: Vec2) -> Self {
        Self {
            left: self.left + margin.x,
            top: self.top + margin.y,
            width: self.width - margin.x * 2.0,
            height: self.height - margin.y * 2.0,
        }
    }

    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left
            && point.x <= self.right()
            && point.y >= self.top
            && point.y <= self.bottom()
    }

    /// Clamps `point` so that a circle of `radius` centred on it stays inside.
    #[must_use]
    pub fn clamp_circle(&self, point: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            (self.left + radius).max(point.x.min(self.right() - radius)),
            (self.top + radius).max(point.y.min(self.bottom() - radius)),
        )
    }
}

/// RGBA colour handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}
