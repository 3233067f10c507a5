//! Configuration errors
//!
//! Raised when the sky is built. Anything reported here would leave an
//! entity kind permanently unable to appear, so construction fails fast.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be between 0 and 1 (got {value})")]
    InvalidProbability { field: &'static str, value: f32 },

    #[error("{field} has min {min} greater than max {max}")]
    InvalidRange { field: &'static str, min: f32, max: f32 },

    #[error("bird spawning is enabled but no perches are configured")]
    NoPerches,

    #[error("perch policy ResetAll requires single_bird = true")]
    ResetAllNeedsSingleBird,

    #[error("cloud spawning is enabled but the pool capacity is zero")]
    EmptyPool,

    #[error("star fade-in {fade_in} plus fade-out {fade_out} exceeds life time {life_time}")]
    StarFadesExceedLife { fade_in: f32, fade_out: f32, life_time: f32 },

    #[error("viewport half-extents must be positive (got {half_width} x {half_height})")]
    InvalidViewport { half_width: f32, half_height: f32 },

    #[error("IO error: {0}")]
    Io(String),

    #[error("parse error: {0}")]
    Parse(String),
}
