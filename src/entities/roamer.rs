//! The roamer: a visitor that crosses the sky dropping items
//!
//! Only one roamer is ever live. While it is around, birds chase it and
//! stars turn into shooting stars.

use rand::Rng;

use super::common::{Appearance, Facing, Step};
use crate::config::RoamerConfig;
use crate::world::{Boundary, Edge, Vec2};

/// How far outside the edge a roamer appears
const SPAWN_OUTSET: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoamerState {
    Roaming,
    /// Terminal
    Leaving,
}

/// Request to put an item into the sky
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropRequest {
    pub position: Vec2,
    pub size: f32,
}

#[derive(Debug, Clone)]
pub struct Roamer {
    position: Vec2,
    velocity: Vec2,
    state: RoamerState,
    life_timer: f32,
    drop_timer: f32,
    facing: Facing,
}

impl Roamer {
    /// Spawn just outside a random side edge at vertical center
    pub fn new(cfg: &RoamerConfig, boundary: &impl Boundary, rng: &mut impl Rng) -> Self {
        let edge = if rng.gen_bool(0.5) { Edge::Left } else { Edge::Right };
        Self::from_edge(edge, cfg, boundary, rng)
    }

    pub fn from_edge(
        edge: Edge,
        cfg: &RoamerConfig,
        boundary: &impl Boundary,
        rng: &mut impl Rng,
    ) -> Self {
        let position = boundary.edge_point(edge, 0.0, SPAWN_OUTSET);
        let velocity = Vec2::new(edge.inward_x() * cfg.speed, 0.0);

        Self {
            position,
            velocity,
            state: RoamerState::Roaming,
            life_timer: cfg.life_time,
            drop_timer: cfg.drop_interval.sample(rng),
            facing: Facing::from_dx(velocity.x, Facing::Right),
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn state(&self) -> RoamerState {
        self.state
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn life_timer(&self) -> f32 {
        self.life_timer
    }

    pub fn appearance(&self) -> Appearance {
        Appearance::new(self.position, self.facing, 1.0, 1.0)
    }

    /// Advance one tick.
    ///
    /// Returns the step outcome and, when the drop timer ran out, an item
    /// to spawn.
    pub fn update(
        &mut self,
        dt: f32,
        cfg: &RoamerConfig,
        rng: &mut impl Rng,
    ) -> (Step, Option<DropRequest>) {
        if self.state == RoamerState::Leaving {
            return (Step::Release, None);
        }

        self.life_timer -= dt;
        if self.life_timer <= 0.0 {
            log::debug!("Roamer state transition: Roaming -> Leaving");
            self.state = RoamerState::Leaving;
            return (Step::Release, None);
        }

        self.position += self.velocity * dt;
        self.facing = Facing::from_dx(self.velocity.x, self.facing);

        self.drop_timer -= dt;
        let drop = if self.drop_timer <= 0.0 {
            self.drop_timer = cfg.drop_interval.sample(rng);
            Some(DropRequest {
                position: self.position - Vec2::new(0.0, cfg.drop_offset),
                size: cfg.item_size.sample(rng),
            })
        } else {
            None
        };

        (Step::Continue, drop)
    }
}
