//! Simulation settings
//!
//! Every interval, speed, size range and count the sky uses lives here so
//! hosts can tune the scene without touching the state machines.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::world::Vec2;

// ============================================================================
// Value types
// ============================================================================

/// Inclusive float range sampled uniformly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample in `[min, max]`
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// How long a spawn timer waits between triggers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Interval {
    /// Same wait every time
    Fixed(f32),
    /// Wait resampled uniformly on every trigger
    Random(Span),
}

impl Interval {
    pub fn sample(&self, rng: &mut impl Rng) -> f32 {
        match self {
            Interval::Fixed(secs) => *secs,
            Interval::Random(span) => span.sample(rng),
        }
    }
}

/// What happens to perches once a bird has left and the cooldown is over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PerchPolicy {
    /// Only the perch the departed bird held comes back
    #[default]
    ReturnAssigned,
    /// The whole configured perch set is restored at once
    ResetAll,
}

// ============================================================================
// Per-kind settings
// ============================================================================

/// Bird behavior and spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BirdConfig {
    pub enabled: bool,
    /// Allow only one live bird at a time
    pub single_bird: bool,
    pub perch_policy: PerchPolicy,
    pub perches: Vec<Vec2>,
    /// Wait before the very first bird
    pub initial_delay: f32,
    /// Cooldown between a bird leaving and the next one being allowed
    pub spawn_delay: f32,
    pub base_speed: f32,
    /// Speed used when heading to a perch or leaving
    pub perch_speed: f32,
    pub wander_time: Span,
    pub perch_stay: Span,
    pub chase_duration: f32,
    /// Sightings ignored for this long after a chase ends
    pub chase_cooldown: f32,
    pub life_time: f32,
    pub arrive_epsilon: f32,
    /// Off-screen point birds leave toward
    pub fly_away_target: Vec2,
    /// Vertical spawn band along the side edges, as a fraction of half-height
    pub spawn_band: Span,
    /// Clouds closer than this to a bird become disturbed
    pub disturb_radius: f32,
}

impl Default for BirdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            single_bird: true,
            perch_policy: PerchPolicy::ReturnAssigned,
            perches: vec![
                Vec2::new(-5.0, -2.5),
                Vec2::new(-1.5, -3.0),
                Vec2::new(2.0, -2.8),
                Vec2::new(5.5, -2.2),
            ],
            initial_delay: 3.0,
            spawn_delay: 5.0,
            base_speed: 2.0,
            perch_speed: 5.0,
            wander_time: Span::new(3.0, 6.0),
            perch_stay: Span::new(2.0, 5.0),
            chase_duration: 5.0,
            chase_cooldown: 8.0,
            life_time: 20.0,
            arrive_epsilon: 0.01,
            fly_away_target: Vec2::new(12.0, 8.0),
            spawn_band: Span::new(0.0, 0.8),
            disturb_radius: 1.5,
        }
    }
}

/// Cloud behavior, pooling and spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    pub enabled: bool,
    pub pool_capacity: usize,
    pub spawn_interval: Interval,
    pub drift: Span,
    pub max_vertical_drift: f32,
    pub size: Span,
    pub lifespan: f32,
    pub size_decay_speed: f32,
    /// Opacity lost per second while dying
    pub fade_rate: f32,
    pub idle_chance_per_second: f32,
    pub jitter_speed: f32,
    /// Share of the lifespan a disturbance lasts
    pub disturbed_fraction: f32,
    /// Chance a spawned cloud uses the simple Moving/Dying variant
    pub simple_fraction: f32,
    pub spawn_band: Span,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pool_capacity: 20,
            spawn_interval: Interval::Fixed(5.0),
            drift: Span::new(0.1, 0.8),
            max_vertical_drift: 0.05,
            size: Span::new(1.0, 2.0),
            lifespan: 50.0,
            size_decay_speed: 0.05,
            fade_rate: 0.05,
            idle_chance_per_second: 0.02,
            jitter_speed: 1.0,
            disturbed_fraction: 0.1,
            simple_fraction: 0.25,
            spawn_band: Span::new(0.2, 0.9),
        }
    }
}

/// Falling star behavior and spawning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarConfig {
    pub enabled: bool,
    pub spawn_interval: Interval,
    pub fade_in_time: f32,
    pub fade_out_time: f32,
    pub fall_speed: Span,
    pub size: Span,
    pub life_time: f32,
    pub shooting_horizontal_speed: f32,
    pub shooting_gravity: f32,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spawn_interval: Interval::Random(Span::new(1.0, 3.0)),
            fade_in_time: 1.0,
            fade_out_time: 0.5,
            fall_speed: Span::new(0.2, 0.5),
            size: Span::new(0.5, 1.5),
            life_time: 5.0,
            shooting_horizontal_speed: 3.0,
            shooting_gravity: 1.5,
        }
    }
}

/// The wandering visitor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoamerConfig {
    pub enabled: bool,
    pub first_delay: f32,
    /// Wait after a roamer leaves before the next; `None` means it visits once
    pub repeat_interval: Option<f32>,
    pub speed: f32,
    pub life_time: f32,
    pub drop_interval: Span,
    pub item_size: Span,
    /// How far below the roamer dropped items appear
    pub drop_offset: f32,
}

impl Default for RoamerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            first_delay: 30.0,
            repeat_interval: Some(90.0),
            speed: 2.0,
            life_time: 10.0,
            drop_interval: Span::new(0.5, 1.5),
            item_size: Span::new(0.5, 1.5),
            drop_offset: 0.5,
        }
    }
}

/// Items dropped by the roamer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroppedItemConfig {
    pub fall_speed: f32,
    /// Safety limit in case an item never leaves the screen
    pub max_life: f32,
}

impl Default for DroppedItemConfig {
    fn default() -> Self {
        Self { fall_speed: 1.0, max_life: 30.0 }
    }
}

/// Complete sky configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    /// Fixed RNG seed; `None` seeds from entropy
    pub seed: Option<u64>,
    pub birds: BirdConfig,
    pub clouds: CloudConfig,
    pub stars: StarConfig,
    pub roamer: RoamerConfig,
    pub items: DroppedItemConfig,
    pub music: MusicConfig,
}

/// Background music volume envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicConfig {
    pub fade_in_time: f32,
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self { fade_in_time: 2.0 }
    }
}

// ============================================================================
// Validation
// ============================================================================

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    // Written this way so NaN is rejected too
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { field, value })
    }
}

fn ordered(field: &'static str, span: Span) -> Result<(), ConfigError> {
    if span.min <= span.max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { field, min: span.min, max: span.max })
    }
}

fn positive_span(field: &'static str, span: Span) -> Result<(), ConfigError> {
    ordered(field, span)?;
    positive(field, span.min)
}

fn positive_interval(field: &'static str, interval: Interval) -> Result<(), ConfigError> {
    match interval {
        Interval::Fixed(secs) => positive(field, secs),
        Interval::Random(span) => positive_span(field, span),
    }
}

impl BirdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.perches.is_empty() {
            return Err(ConfigError::NoPerches);
        }
        if self.perch_policy == PerchPolicy::ResetAll && !self.single_bird {
            return Err(ConfigError::ResetAllNeedsSingleBird);
        }
        non_negative("birds.initial_delay", self.initial_delay)?;
        positive("birds.spawn_delay", self.spawn_delay)?;
        positive("birds.base_speed", self.base_speed)?;
        positive("birds.perch_speed", self.perch_speed)?;
        positive_span("birds.wander_time", self.wander_time)?;
        positive_span("birds.perch_stay", self.perch_stay)?;
        positive("birds.chase_duration", self.chase_duration)?;
        non_negative("birds.chase_cooldown", self.chase_cooldown)?;
        positive("birds.life_time", self.life_time)?;
        positive("birds.arrive_epsilon", self.arrive_epsilon)?;
        ordered("birds.spawn_band", self.spawn_band)?;
        non_negative("birds.disturb_radius", self.disturb_radius)
    }
}

impl CloudConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.pool_capacity == 0 {
            return Err(ConfigError::EmptyPool);
        }
        positive_interval("clouds.spawn_interval", self.spawn_interval)?;
        positive_span("clouds.drift", self.drift)?;
        non_negative("clouds.max_vertical_drift", self.max_vertical_drift)?;
        positive_span("clouds.size", self.size)?;
        positive("clouds.lifespan", self.lifespan)?;
        non_negative("clouds.size_decay_speed", self.size_decay_speed)?;
        positive("clouds.fade_rate", self.fade_rate)?;
        probability("clouds.idle_chance_per_second", self.idle_chance_per_second)?;
        non_negative("clouds.jitter_speed", self.jitter_speed)?;
        positive("clouds.disturbed_fraction", self.disturbed_fraction)?;
        probability("clouds.simple_fraction", self.simple_fraction)?;
        ordered("clouds.spawn_band", self.spawn_band)
    }
}

impl StarConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        positive_interval("stars.spawn_interval", self.spawn_interval)?;
        positive("stars.fade_in_time", self.fade_in_time)?;
        positive("stars.fade_out_time", self.fade_out_time)?;
        positive_span("stars.fall_speed", self.fall_speed)?;
        positive_span("stars.size", self.size)?;
        positive("stars.life_time", self.life_time)?;
        // Dying is forced at `life_timer <= fade_out_time`, so both fades must fit
        if self.fade_in_time + self.fade_out_time > self.life_time {
            return Err(ConfigError::StarFadesExceedLife {
                fade_in: self.fade_in_time,
                fade_out: self.fade_out_time,
                life_time: self.life_time,
            });
        }
        non_negative("stars.shooting_gravity", self.shooting_gravity)
    }
}

impl RoamerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        non_negative("roamer.first_delay", self.first_delay)?;
        if let Some(repeat) = self.repeat_interval {
            positive("roamer.repeat_interval", repeat)?;
        }
        positive("roamer.speed", self.speed)?;
        positive("roamer.life_time", self.life_time)?;
        positive_span("roamer.drop_interval", self.drop_interval)?;
        positive_span("roamer.item_size", self.item_size)?;
        non_negative("roamer.drop_offset", self.drop_offset)
    }
}

impl SkyConfig {
    /// Reject settings that would leave a subsystem permanently stuck
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.birds.validate()?;
        self.clouds.validate()?;
        self.stars.validate()?;
        self.roamer.validate()?;
        if self.roamer.enabled {
            positive("items.fall_speed", self.items.fall_speed)?;
            positive("items.max_life", self.items.max_life)?;
        }
        positive("music.fade_in_time", self.music.fade_in_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(SkyConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = SkyConfig::default();
        config.clouds.spawn_interval = Interval::Fixed(0.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "clouds.spawn_interval", value: 0.0 })
        );
    }

    #[test]
    fn test_empty_perches_rejected_only_when_birds_enabled() {
        let mut config = SkyConfig::default();
        config.birds.perches.clear();
        assert_eq!(config.validate(), Err(ConfigError::NoPerches));

        config.birds.enabled = false;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_reset_all_requires_single_bird() {
        let mut config = SkyConfig::default();
        config.birds.perch_policy = PerchPolicy::ResetAll;
        config.birds.single_bird = false;
        assert_eq!(config.validate(), Err(ConfigError::ResetAllNeedsSingleBird));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = SkyConfig::default();
        config.birds.perch_stay = Span::new(5.0, 2.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { field: "birds.perch_stay", .. })
        ));
    }

    #[test]
    fn test_nan_rejected() {
        let mut config = SkyConfig::default();
        config.stars.life_time = f32::NAN;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "stars.life_time", .. })
        ));
    }

    #[test]
    fn test_star_fades_must_fit_in_life_time() {
        let mut config = SkyConfig::default();
        config.stars.life_time = 0.4;
        config.stars.fade_out_time = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::StarFadesExceedLife { .. })));

        // Fade-in alone fits but not together with the fade-out
        config.stars.life_time = 1.2;
        config.stars.fade_in_time = 1.0;
        config.stars.fade_out_time = 0.5;
        assert_eq!(
            config.validate(),
            Err(ConfigError::StarFadesExceedLife { fade_in: 1.0, fade_out: 0.5, life_time: 1.2 })
        );

        config.stars.life_time = 1.5;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_empty_pool_rejected() {
        let mut config = SkyConfig::default();
        config.clouds.pool_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::EmptyPool));
    }

    #[test]
    fn test_span_sampling_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let span = Span::new(2.0, 5.0);
        for _ in 0..100 {
            assert!(span.contains(span.sample(&mut rng)));
        }
        assert_eq!(Span::new(3.0, 3.0).sample(&mut rng), 3.0);
    }
}
