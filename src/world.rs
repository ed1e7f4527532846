use macroquad::prelude::*;

/// Usable rectangle of the drawing surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// False while the surface is unmounted, hidden or collapsed.
    pub fn is_measurable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// Largest top-left coordinate that keeps a sprite of `size` on screen.
    /// Pinned to the origin when the sprite does not fit.
    pub fn max_pos(&self, size: f32) -> Vec2 {
        vec2((self.width - size).max(0.0), (self.height - size).max(0.0))
    }

    pub fn contains(&self, pos: Vec2, size: f32) -> bool {
        let max = self.max_pos(size);
        pos.x >= 0.0 && pos.y >= 0.0 && pos.x <= max.x && pos.y <= max.y
    }

    /// Clamp a sprite back onto the surface, reflecting the velocity
    /// component of every axis it crossed. Speed is preserved.
    pub fn reflect(&self, mut pos: Vec2, mut velocity: Vec2, size: f32) -> (Vec2, Vec2) {
        let max = self.max_pos(size);
        (pos.x, velocity.x) = reflect_axis(pos.x, velocity.x, max.x);
        (pos.y, velocity.y) = reflect_axis(pos.y, velocity.y, max.y);
        (pos, velocity)
    }
}

fn reflect_axis(p: f32, v: f32, max: f32) -> (f32, f32) {
    if p < 0.0 {
        (0.0, v.abs())
    } else if p > max {
        (max, -v.abs())
    } else {
        (p, v)
    }
}
