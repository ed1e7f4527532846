use macroquad::prelude::*;

/// Stable index of an agent inside its ensemble.
///
/// Agents are created once at construction and only ever repositioned, so a
/// plain index never goes stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct AgentId(pub usize);

/// One wandering sprite.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    /// Top-left corner in surface pixels.
    pub pos: Vec2,
    pub velocity: Vec2,
    /// Visual extent along both axes.
    pub size: f32,
}

impl Agent {
    pub fn new(size: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}
