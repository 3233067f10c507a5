//! Bird state machine
//!
//! A bird wanders for a while, heads for the perch it was assigned, rests
//! there, and finally flies off screen. Seeing the chase target interrupts
//! whatever it is doing, except leaving.

use hecs::Entity;
use rand::Rng;

use super::common::{Appearance, Facing, Step};
use crate::config::BirdConfig;
use crate::world::{Boundary, PerchId, Vec2};

/// Behavioral states of a bird
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BirdState {
    FlyingAround,
    FlyingToPerch,
    Perched,
    Chasing,
    /// Terminal: heading off screen
    FlyingAway,
}

/// Things that can happen to a bird during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirdEvent {
    TimerExpired,
    ArrivedAtPerch,
    TargetSighted,
    TargetLost,
    LifeExpired,
}

/// Transition table: `None` means the event is ignored in that state
pub fn transition(state: BirdState, event: BirdEvent) -> Option<BirdState> {
    use BirdEvent::*;
    use BirdState::*;

    match (state, event) {
        // Leaving overrides everything and cannot be interrupted
        (FlyingAway, _) => None,
        (_, LifeExpired) => Some(FlyingAway),
        (Chasing, TargetSighted) => None,
        (_, TargetSighted) => Some(Chasing),
        (FlyingAround, TimerExpired) => Some(FlyingToPerch),
        (FlyingToPerch, ArrivedAtPerch) => Some(Perched),
        (Perched, TimerExpired) => Some(FlyingAway),
        (Chasing, TargetLost) | (Chasing, TimerExpired) => Some(FlyingAround),
        _ => None,
    }
}

/// A bird in the sky
#[derive(Debug, Clone)]
pub struct Bird {
    position: Vec2,
    state: BirdState,
    state_timer: f32,
    life_timer: f32,
    perch: PerchId,
    perch_position: Vec2,
    wander_target: Vec2,
    chase_target: Option<Entity>,
    /// Seconds left during which sightings are ignored
    chase_cooldown: f32,
    facing: Facing,
}

impl Bird {
    /// Create a bird that starts out flying around
    pub fn new(
        position: Vec2,
        perch: PerchId,
        perch_position: Vec2,
        cfg: &BirdConfig,
        boundary: &impl Boundary,
        rng: &mut impl Rng,
    ) -> Self {
        let mut bird = Self {
            position,
            state: BirdState::FlyingAround,
            state_timer: 0.0,
            life_timer: cfg.life_time,
            perch,
            perch_position,
            wander_target: position,
            chase_target: None,
            chase_cooldown: 0.0,
            facing: Facing::default(),
        };
        bird.enter(BirdState::FlyingAround, cfg, boundary, rng);
        bird
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn state(&self) -> BirdState {
        self.state
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn life_timer(&self) -> f32 {
        self.life_timer
    }

    pub fn perch(&self) -> PerchId {
        self.perch
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn chase_target(&self) -> Option<Entity> {
        self.chase_target
    }

    /// Hand the bird the entity it should chase when that entity is visible
    pub fn set_chase_target(&mut self, target: Option<Entity>) {
        self.chase_target = target;
    }

    pub fn appearance(&self) -> Appearance {
        Appearance::new(self.position, self.facing, 1.0, 1.0)
    }

    /// Switch state, running exit and entry actions.
    ///
    /// Returns false (and does nothing) when already in `new_state`.
    pub fn change_state(
        &mut self,
        new_state: BirdState,
        cfg: &BirdConfig,
        boundary: &impl Boundary,
        rng: &mut impl Rng,
    ) -> bool {
        if new_state == self.state {
            return false;
        }

        log::debug!("Bird state transition: {:?} -> {:?}", self.state, new_state);

        if self.state == BirdState::Chasing {
            self.chase_cooldown = cfg.chase_cooldown;
        }
        self.enter(new_state, cfg, boundary, rng);
        true
    }

    /// Feed an event through the transition table
    pub fn handle(
        &mut self,
        event: BirdEvent,
        cfg: &BirdConfig,
        boundary: &impl Boundary,
        rng: &mut impl Rng,
    ) -> bool {
        match transition(self.state, event) {
            Some(next) => self.change_state(next, cfg, boundary, rng),
            None => false,
        }
    }

    fn enter(
        &mut self,
        state: BirdState,
        cfg: &BirdConfig,
        boundary: &impl Boundary,
        rng: &mut impl Rng,
    ) {
        self.state = state;
        self.state_timer = 0.0;

        match state {
            BirdState::FlyingAround => {
                self.wander_target = random_visible_point(boundary, rng);
                self.state_timer = cfg.wander_time.sample(rng);
            }
            BirdState::FlyingToPerch => {
                self.facing = Facing::toward(self.position, self.perch_position, self.facing);
            }
            BirdState::Perched => {
                self.position = self.perch_position;
                self.state_timer = cfg.perch_stay.sample(rng);
            }
            BirdState::Chasing => {
                self.state_timer = cfg.chase_duration;
            }
            BirdState::FlyingAway => {}
        }
    }

    /// Advance one tick.
    ///
    /// `target` is the chase target's position if that entity is still alive.
    pub fn update(
        &mut self,
        dt: f32,
        target: Option<Vec2>,
        cfg: &BirdConfig,
        boundary: &impl Boundary,
        rng: &mut impl Rng,
    ) -> Step {
        self.state_timer -= dt;
        self.life_timer -= dt;
        self.chase_cooldown = (self.chase_cooldown - dt).max(0.0);

        if self.life_timer <= 0.0 {
            self.handle(BirdEvent::LifeExpired, cfg, boundary, rng);
        }

        let sighted = target.filter(|&t| boundary.is_visible(t));
        match (self.state, sighted) {
            (BirdState::Chasing, None) => {
                self.handle(BirdEvent::TargetLost, cfg, boundary, rng);
            }
            (_, Some(_)) if self.chase_cooldown <= 0.0 => {
                self.handle(BirdEvent::TargetSighted, cfg, boundary, rng);
            }
            _ => {}
        }

        match self.state {
            BirdState::FlyingAround => {
                self.fly_towards(self.wander_target, cfg.base_speed, dt);
                if self.position.distance(self.wander_target) <= cfg.arrive_epsilon {
                    self.wander_target = random_visible_point(boundary, rng);
                }
                if self.state_timer <= 0.0 {
                    self.handle(BirdEvent::TimerExpired, cfg, boundary, rng);
                }
            }
            BirdState::FlyingToPerch => {
                self.fly_towards(self.perch_position, cfg.perch_speed, dt);
                self.facing = Facing::toward(self.position, self.perch_position, self.facing);
                if self.position.distance(self.perch_position) <= cfg.arrive_epsilon {
                    self.handle(BirdEvent::ArrivedAtPerch, cfg, boundary, rng);
                }
            }
            BirdState::Perched => {
                if self.state_timer <= 0.0 {
                    self.handle(BirdEvent::TimerExpired, cfg, boundary, rng);
                }
            }
            BirdState::Chasing => {
                if let Some(t) = sighted {
                    self.fly_towards(t, cfg.base_speed, dt);
                }
                if self.state_timer <= 0.0 {
                    self.handle(BirdEvent::TimerExpired, cfg, boundary, rng);
                }
            }
            BirdState::FlyingAway => {
                self.fly_towards(cfg.fly_away_target, cfg.perch_speed, dt);
                if self.position.distance(cfg.fly_away_target) <= cfg.arrive_epsilon {
                    return Step::Release;
                }
            }
        }

        Step::Continue
    }

    fn fly_towards(&mut self, target: Vec2, speed: f32, dt: f32) {
        let next = self.position.move_towards(target, speed * dt);
        self.facing = Facing::from_dx(next.x - self.position.x, self.facing);
        self.position = next;
    }
}

fn random_visible_point(boundary: &impl Boundary, rng: &mut impl Rng) -> Vec2 {
    let ext = boundary.extents();
    Vec2::new(rng.gen_range(-ext.x..=ext.x), rng.gen_range(-ext.y..=ext.y))
}
