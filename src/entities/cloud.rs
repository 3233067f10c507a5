//! Cloud state machine
//!
//! Clouds are pooled: they are never destroyed, only released back to the
//! pool and re-activated later with fresh random parameters.

use rand::Rng;

use super::common::{Appearance, Facing, Step};
use crate::config::CloudConfig;
use crate::world::{Boundary, Vec2};

/// Share of the lifespan after which a moving cloud starts dying
const AGING_THRESHOLD: f32 = 0.8;
/// Lifespan counts this much faster while disturbed
const DISTURBED_AGE_RATE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudState {
    Moving,
    Idle,
    Disturbed,
    /// Terminal: fading out
    Dying,
}

/// Behavior set a cloud was activated with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudVariant {
    /// Moving, Idle, Disturbed and Dying
    Full,
    /// Only Moving and Dying
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudEvent {
    /// Random chance to rest
    RestChance,
    ShrinkDone,
    BirdNear,
    BirdGone,
    DisturbanceOver,
    /// Past the aging threshold of its lifespan
    Aged,
    LifeExpired,
}

/// Transition table for clouds
pub fn transition(state: CloudState, variant: CloudVariant, event: CloudEvent) -> Option<CloudState> {
    use CloudEvent::*;
    use CloudState::*;

    match (state, event) {
        (Dying, _) => None,
        (_, LifeExpired) => Some(Dying),
        (Moving, Aged) => Some(Dying),
        _ if variant == CloudVariant::Simple => None,
        (Moving, RestChance) => Some(Idle),
        (Idle, ShrinkDone) => Some(Moving),
        (Moving, BirdNear) | (Idle, BirdNear) => Some(Disturbed),
        (Disturbed, BirdGone) | (Disturbed, DisturbanceOver) => Some(Moving),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct Cloud {
    position: Vec2,
    velocity: Vec2,
    size: f32,
    opacity: f32,
    /// Seconds of lifespan used up (runs faster while disturbed)
    age: f32,
    state: CloudState,
    variant: CloudVariant,
    /// Countdown used by the Disturbed state
    state_timer: f32,
    bird_nearby: bool,
}

impl Cloud {
    /// A pre-allocated cloud waiting in the pool
    pub fn dormant() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            size: 1.0,
            opacity: 0.0,
            age: 0.0,
            state: CloudState::Moving,
            variant: CloudVariant::Full,
            state_timer: 0.0,
            bird_nearby: false,
        }
    }

    /// Re-initialize with fresh random parameters at `position`.
    ///
    /// Clouds spawned left of center drift right and vice versa.
    pub fn activate(&mut self, position: Vec2, cfg: &CloudConfig, rng: &mut impl Rng) {
        let direction = if position.x < 0.0 { 1.0 } else { -1.0 };
        let vertical = if cfg.max_vertical_drift > 0.0 {
            rng.gen_range(-cfg.max_vertical_drift..=cfg.max_vertical_drift)
        } else {
            0.0
        };

        self.position = position;
        self.velocity = Vec2::new(cfg.drift.sample(rng) * direction, vertical);
        self.size = cfg.size.sample(rng);
        self.opacity = 1.0;
        self.age = 0.0;
        self.state = CloudState::Moving;
        self.state_timer = 0.0;
        self.bird_nearby = false;
        self.variant = if rng.gen_bool(f64::from(cfg.simple_fraction)) {
            CloudVariant::Simple
        } else {
            CloudVariant::Full
        };
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn state(&self) -> CloudState {
        self.state
    }

    pub fn variant(&self) -> CloudVariant {
        self.variant
    }

    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn age(&self) -> f32 {
        self.age
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn appearance(&self) -> Appearance {
        let facing = Facing::from_dx(self.velocity.x, Facing::Right);
        Appearance::new(self.position, facing, self.opacity, self.size)
    }

    pub fn change_state(&mut self, new_state: CloudState, cfg: &CloudConfig) -> bool {
        if new_state == self.state {
            return false;
        }
        log::debug!("Cloud state transition: {:?} -> {:?}", self.state, new_state);

        self.state = new_state;
        self.state_timer = 0.0;
        if new_state == CloudState::Disturbed {
            self.state_timer = cfg.disturbed_fraction * cfg.lifespan;
        }
        true
    }

    pub fn handle(&mut self, event: CloudEvent, cfg: &CloudConfig) -> bool {
        match transition(self.state, self.variant, event) {
            Some(next) => self.change_state(next, cfg),
            None => false,
        }
    }

    /// Report whether a bird is close by.
    ///
    /// Only changes in proximity count; a bird hovering nearby does not
    /// keep re-disturbing the cloud.
    pub fn set_bird_nearby(&mut self, nearby: bool, cfg: &CloudConfig) {
        if nearby == self.bird_nearby {
            return;
        }
        self.bird_nearby = nearby;
        let event = if nearby { CloudEvent::BirdNear } else { CloudEvent::BirdGone };
        self.handle(event, cfg);
    }

    /// Advance one tick. `Step::Release` means "return me to the pool".
    pub fn update(
        &mut self,
        dt: f32,
        cfg: &CloudConfig,
        boundary: &impl Boundary,
        rng: &mut impl Rng,
    ) -> Step {
        let age_rate = if self.state == CloudState::Disturbed { DISTURBED_AGE_RATE } else { 1.0 };
        self.age += dt * age_rate;

        match self.state {
            CloudState::Moving => {
                self.position += self.velocity * dt;
                let rest_chance = (cfg.idle_chance_per_second * dt).clamp(0.0, 1.0);
                if rng.gen_bool(f64::from(rest_chance)) {
                    self.handle(CloudEvent::RestChance, cfg);
                }
                if self.age >= cfg.lifespan * AGING_THRESHOLD {
                    self.handle(CloudEvent::Aged, cfg);
                }
            }
            CloudState::Idle => {
                let floor = cfg.size.min;
                self.size = (self.size - cfg.size_decay_speed * dt).max(floor);
                if self.size <= floor {
                    self.handle(CloudEvent::ShrinkDone, cfg);
                }
            }
            CloudState::Disturbed => {
                let jitter = rng.gen_range(-1.0f32..=1.0) * cfg.jitter_speed * dt;
                self.position.x += jitter;
                self.state_timer -= dt * DISTURBED_AGE_RATE;
                if self.state_timer <= 0.0 {
                    self.handle(CloudEvent::DisturbanceOver, cfg);
                }
            }
            CloudState::Dying => {
                self.opacity -= cfg.fade_rate * dt;
                if self.opacity <= 0.0 {
                    self.opacity = 0.0;
                    return Step::Release;
                }
            }
        }

        if self.state != CloudState::Dying {
            if self.age >= cfg.lifespan {
                self.handle(CloudEvent::LifeExpired, cfg);
            } else if !boundary.contains(self.position, cfg.size.max) {
                return Step::Release;
            }
        }

        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Viewport;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const DT: f32 = 0.1;

    fn calm_config() -> CloudConfig {
        CloudConfig {
            idle_chance_per_second: 0.0,
            simple_fraction: 0.0,
            lifespan: 10.0,
            fade_rate: 1.0,
            ..CloudConfig::default()
        }
    }

    fn active_cloud(cfg: &CloudConfig, at: Vec2, rng: &mut StdRng) -> Cloud {
        let mut cloud = Cloud::dormant();
        cloud.activate(at, cfg, rng);
        cloud
    }

    fn big_viewport() -> Viewport {
        Viewport::new(100.0, 100.0)
    }

    #[test]
    fn test_transition_table() {
        use CloudEvent::*;
        use CloudState::*;
        let full = CloudVariant::Full;
        let simple = CloudVariant::Simple;

        assert_eq!(transition(Moving, full, RestChance), Some(Idle));
        assert_eq!(transition(Idle, full, ShrinkDone), Some(Moving));
        assert_eq!(transition(Moving, full, BirdNear), Some(Disturbed));
        assert_eq!(transition(Disturbed, full, DisturbanceOver), Some(Moving));
        assert_eq!(transition(Disturbed, full, LifeExpired), Some(Dying));
        assert_eq!(transition(Dying, full, BirdNear), None);

        assert_eq!(transition(Moving, simple, RestChance), None);
        assert_eq!(transition(Moving, simple, BirdNear), None);
        assert_eq!(transition(Moving, simple, Aged), Some(Dying));
    }

    #[test]
    fn test_activation_drifts_toward_far_side() {
        let cfg = calm_config();
        let mut rng = StdRng::seed_from_u64(3);

        let left = active_cloud(&cfg, Vec2::new(-5.0, 2.0), &mut rng);
        assert!(left.velocity().x > 0.0);
        let right = active_cloud(&cfg, Vec2::new(5.0, 2.0), &mut rng);
        assert!(right.velocity().x < 0.0);

        assert!(cfg.size.contains(left.size()));
        assert_eq!(left.opacity(), 1.0);
        assert_eq!(left.state(), CloudState::Moving);
    }

    #[test]
    fn test_ages_into_dying_then_releases() {
        let cfg = calm_config();
        let vp = big_viewport();
        let mut rng = StdRng::seed_from_u64(5);
        let mut cloud = active_cloud(&cfg, Vec2::new(-5.0, 0.0), &mut rng);

        let mut ticks = 0;
        while cloud.state() == CloudState::Moving {
            assert_eq!(cloud.update(DT, &cfg, &vp, &mut rng), Step::Continue);
            ticks += 1;
        }
        assert_eq!(cloud.state(), CloudState::Dying);
        // 80% of a 10 second lifespan
        assert!((79..=81).contains(&ticks), "started dying after {} ticks", ticks);

        let mut released = false;
        for _ in 0..20 {
            if cloud.update(DT, &cfg, &vp, &mut rng) == Step::Release {
                released = true;
                break;
            }
        }
        assert!(released);
        assert_eq!(cloud.opacity(), 0.0);
    }

    #[test]
    fn test_leaving_viewport_releases_immediately() {
        let cfg = calm_config();
        let vp = Viewport::new(8.0, 5.0);
        let mut rng = StdRng::seed_from_u64(9);
        // Right at the margin, drifting outward is impossible, so start outside
        let mut cloud = active_cloud(&cfg, Vec2::new(-8.0 - cfg.size.max - 0.5, 0.0), &mut rng);
        assert_eq!(cloud.update(DT, &cfg, &vp, &mut rng), Step::Release);
    }

    #[test]
    fn test_disturbance_ages_faster_and_wears_off() {
        let cfg = calm_config();
        let vp = big_viewport();
        let mut rng = StdRng::seed_from_u64(2);
        let mut cloud = active_cloud(&cfg, Vec2::ZERO, &mut rng);

        cloud.set_bird_nearby(true, &cfg);
        assert_eq!(cloud.state(), CloudState::Disturbed);

        cloud.update(DT, &cfg, &vp, &mut rng);
        assert!((cloud.age() - 2.0 * DT).abs() < 1e-5);

        // 10% of the lifespan at double rate is 0.5s
        for _ in 0..5 {
            cloud.update(DT, &cfg, &vp, &mut rng);
        }
        assert_eq!(cloud.state(), CloudState::Moving);

        // Bird is still nearby: no re-trigger without it leaving first
        cloud.set_bird_nearby(true, &cfg);
        assert_eq!(cloud.state(), CloudState::Moving);
        cloud.set_bird_nearby(false, &cfg);
        cloud.set_bird_nearby(true, &cfg);
        assert_eq!(cloud.state(), CloudState::Disturbed);
        cloud.set_bird_nearby(false, &cfg);
        assert_eq!(cloud.state(), CloudState::Moving);
    }

    #[test]
    fn test_idle_shrinks_to_floor_then_moves() {
        let cfg = CloudConfig { size_decay_speed: 1.0, ..calm_config() };
        let vp = big_viewport();
        let mut rng = StdRng::seed_from_u64(4);
        let mut cloud = active_cloud(&cfg, Vec2::ZERO, &mut rng);

        cloud.handle(CloudEvent::RestChance, &cfg);
        assert_eq!(cloud.state(), CloudState::Idle);

        for _ in 0..20 {
            cloud.update(DT, &cfg, &vp, &mut rng);
            if cloud.state() == CloudState::Moving {
                break;
            }
        }
        assert_eq!(cloud.state(), CloudState::Moving);
        assert_eq!(cloud.size(), cfg.size.min);
    }

    #[test]
    fn test_simple_variant_ignores_birds() {
        let cfg = CloudConfig { simple_fraction: 1.0, ..calm_config() };
        let mut rng = StdRng::seed_from_u64(8);
        let mut cloud = active_cloud(&cfg, Vec2::ZERO, &mut rng);
        assert_eq!(cloud.variant(), CloudVariant::Simple);

        cloud.set_bird_nearby(true, &cfg);
        assert_eq!(cloud.state(), CloudState::Moving);
    }

    #[test]
    fn test_lifespan_forces_dying_from_idle() {
        // Shrinking never finishes, so only the lifespan can end this cloud
        let cfg = CloudConfig { size_decay_speed: 0.0, size: crate::config::Span::new(1.0, 2.0), ..calm_config() };
        let vp = big_viewport();
        let mut rng = StdRng::seed_from_u64(6);
        let mut cloud = active_cloud(&cfg, Vec2::ZERO, &mut rng);
        // Make sure it is above the floor so it stays idle
        while cloud.size() <= cfg.size.min {
            cloud.activate(Vec2::ZERO, &cfg, &mut rng);
        }
        cloud.handle(CloudEvent::RestChance, &cfg);

        let mut released = false;
        for _ in 0..1_000 {
            if cloud.update(DT, &cfg, &vp, &mut rng) == Step::Release {
                released = true;
                break;
            }
        }
        assert!(released);
    }
}
