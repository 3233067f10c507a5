//! Shared entity vocabulary
//!
//! Kinds, facing, per-tick outcomes and the appearance every entity hands
//! to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::world::Vec2;

/// Every kind of entity that can live in the sky
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Bird,
    Cloud,
    Star,
    Roamer,
    DroppedItem,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Bird,
        EntityKind::Cloud,
        EntityKind::Star,
        EntityKind::Roamer,
        EntityKind::DroppedItem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Bird => "Bird",
            EntityKind::Cloud => "Cloud",
            EntityKind::Star => "Star",
            EntityKind::Roamer => "Roamer",
            EntityKind::DroppedItem => "Dropped item",
        }
    }
}

/// Horizontal facing of a sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// Facing for a horizontal movement delta, keeping `current` when there is none
    pub fn from_dx(dx: f32, current: Facing) -> Self {
        if dx < 0.0 {
            Facing::Left
        } else if dx > 0.0 {
            Facing::Right
        } else {
            current
        }
    }

    /// Facing that looks from `from` toward `to`
    pub fn toward(from: Vec2, to: Vec2, current: Facing) -> Self {
        Self::from_dx(to.x - from.x, current)
    }
}

/// What an entity wants after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep simulating
    Continue,
    /// Terminal state reached: remove from the world (or return to the pool)
    Release,
}

/// Presentation intent computed by the core each tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Appearance {
    pub position: Vec2,
    pub facing: Facing,
    /// 0.0 (invisible) to 1.0 (opaque)
    pub opacity: f32,
    pub scale: f32,
}

impl Appearance {
    pub fn new(position: Vec2, facing: Facing, opacity: f32, scale: f32) -> Self {
        Self {
            position,
            facing,
            opacity: opacity.clamp(0.0, 1.0),
            scale,
        }
    }
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
