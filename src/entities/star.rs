//! Falling star state machine
//!
//! Stars fade in, drift downward and fade out again. While the roamer is
//! in the scene they turn into shooting stars instead.

use hecs::Entity;
use rand::Rng;

use super::common::{lerp, Appearance, Facing, Step};
use crate::config::StarConfig;
use crate::world::{Boundary, Vec2};

/// Share of the lifetime after which falling slows down
const SLOWDOWN_THRESHOLD: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StarState {
    Spawning,
    Falling,
    /// Interrupt: the roamer is around
    Shooting,
    /// Terminal: fading out
    Dying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarEvent {
    FadeInDone,
    TriggerPresent,
    LeftViewport,
    LifeExpired,
}

pub fn transition(state: StarState, event: StarEvent) -> Option<StarState> {
    use StarEvent::*;
    use StarState::*;

    match (state, event) {
        (Dying, _) => None,
        (_, LeftViewport) | (_, LifeExpired) => Some(Dying),
        (Spawning, FadeInDone) => Some(Falling),
        (Spawning, TriggerPresent) | (Falling, TriggerPresent) => Some(Shooting),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Star {
    position: Vec2,
    state: StarState,
    /// Seconds since spawn
    age: f32,
    life_timer: f32,
    opacity: f32,
    size: f32,
    fall_speed: f32,
    /// Vertical velocity while shooting
    shooting_vy: f32,
    shooting_trigger: Option<Entity>,
}

impl Star {
    pub fn new(position: Vec2, cfg: &StarConfig, rng: &mut impl Rng) -> Self {
        Self {
            position,
            state: StarState::Spawning,
            age: 0.0,
            life_timer: cfg.life_time,
            opacity: 0.0,
            size: cfg.size.sample(rng),
            fall_speed: cfg.fall_speed.sample(rng),
            shooting_vy: 0.0,
            shooting_trigger: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn state(&self) -> StarState {
        self.state
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn fall_speed(&self) -> f32 {
        self.fall_speed
    }

    pub fn life_timer(&self) -> f32 {
        self.life_timer
    }

    pub fn shooting_trigger(&self) -> Option<Entity> {
        self.shooting_trigger
    }

    /// Register the entity whose presence turns this into a shooting star
    pub fn set_shooting_trigger(&mut self, trigger: Option<Entity>) {
        self.shooting_trigger = trigger;
    }

    pub fn appearance(&self, cfg: &StarConfig) -> Appearance {
        let facing = if self.state == StarState::Shooting {
            Facing::from_dx(cfg.shooting_horizontal_speed, Facing::Right)
        } else {
            Facing::Right
        };
        Appearance::new(self.position, facing, self.opacity, self.size)
    }

    pub fn change_state(&mut self, new_state: StarState) -> bool {
        if new_state == self.state {
            return false;
        }
        log::debug!("Star state transition: {:?} -> {:?}", self.state, new_state);

        self.state = new_state;
        match new_state {
            StarState::Falling => self.opacity = 1.0,
            StarState::Shooting => self.shooting_vy = 0.0,
            StarState::Spawning | StarState::Dying => {}
        }
        true
    }

    pub fn handle(&mut self, event: StarEvent) -> bool {
        match transition(self.state, event) {
            Some(next) => self.change_state(next),
            None => false,
        }
    }

    /// Advance one tick.
    ///
    /// `trigger_present` says whether the registered shooting trigger is alive.
    pub fn update(
        &mut self,
        dt: f32,
        trigger_present: bool,
        cfg: &StarConfig,
        boundary: &impl Boundary,
    ) -> Step {
        self.age += dt;
        self.life_timer -= dt;

        // The fade-out has to finish inside the lifetime
        if self.life_timer <= cfg.fade_out_time {
            self.handle(StarEvent::LifeExpired);
        } else if !boundary.contains(self.position, cfg.size.max) {
            self.handle(StarEvent::LeftViewport);
        } else if trigger_present {
            self.handle(StarEvent::TriggerPresent);
        }

        match self.state {
            StarState::Spawning => {
                self.fade_in(cfg);
                if self.age >= cfg.fade_in_time {
                    self.handle(StarEvent::FadeInDone);
                }
            }
            StarState::Falling => {
                self.position.y -= self.fall_speed * dt;
                if self.age > cfg.life_time * SLOWDOWN_THRESHOLD {
                    self.fall_speed = lerp(self.fall_speed, 0.0, dt.min(1.0));
                }
            }
            StarState::Shooting => {
                self.fade_in(cfg);
                self.shooting_vy -= cfg.shooting_gravity * dt;
                self.position += Vec2::new(cfg.shooting_horizontal_speed, self.shooting_vy) * dt;
            }
            StarState::Dying => {
                self.opacity -= dt / cfg.fade_out_time;
                if self.opacity <= 0.0 || self.life_timer <= 0.0 {
                    self.opacity = 0.0;
                    return Step::Release;
                }
            }
        }

        Step::Continue
    }

    fn fade_in(&mut self, cfg: &StarConfig) {
        self.opacity = (self.age / cfg.fade_in_time).min(1.0);
    }
}
