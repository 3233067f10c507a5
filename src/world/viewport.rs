//! Viewport bounds and the boundary service
//!
//! Entities never ask "where is the camera"; they ask a [`Boundary`]
//! whether a point is on screen and where the spawn edges are.

use serde::{Deserialize, Serialize};

use super::Vec2;

/// One side of the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    /// Horizontal direction pointing from this edge into the viewport
    pub fn inward_x(self) -> f32 {
        match self {
            Edge::Left => 1.0,
            Edge::Right => -1.0,
            Edge::Top | Edge::Bottom => 0.0,
        }
    }
}

/// Boundary/visibility queries the simulation needs from its host
pub trait Boundary {
    /// Half-width and half-height of the visible area
    fn extents(&self) -> Vec2;

    /// Is the point inside the viewport grown by `margin` on every side?
    fn contains(&self, pos: Vec2, margin: f32) -> bool {
        let ext = self.extents();
        pos.x >= -ext.x - margin
            && pos.x <= ext.x + margin
            && pos.y >= -ext.y - margin
            && pos.y <= ext.y + margin
    }

    /// Is the point strictly on screen?
    fn is_visible(&self, pos: Vec2) -> bool {
        self.contains(pos, 0.0)
    }

    /// A point on `edge`, pushed `outset` beyond it.
    ///
    /// `along` runs from -1.0 to 1.0 across the edge (bottom to top for
    /// vertical edges, left to right for horizontal ones).
    fn edge_point(&self, edge: Edge, along: f32, outset: f32) -> Vec2 {
        let ext = self.extents();
        let along = along.clamp(-1.0, 1.0);
        match edge {
            Edge::Left => Vec2::new(-ext.x - outset, along * ext.y),
            Edge::Right => Vec2::new(ext.x + outset, along * ext.y),
            Edge::Top => Vec2::new(along * ext.x, ext.y + outset),
            Edge::Bottom => Vec2::new(along * ext.x, -ext.y - outset),
        }
    }
}

/// Orthographic viewport centered on the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub half_width: f32,
    pub half_height: f32,
}

impl Viewport {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self { half_width, half_height }
    }

    /// Build from an orthographic size and aspect ratio (width / height)
    pub fn from_ortho(ortho_size: f32, aspect: f32) -> Self {
        Self::new(ortho_size * aspect, ortho_size)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_ortho(5.0, 16.0 / 9.0)
    }
}

impl Boundary for Viewport {
    fn extents(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }
}
