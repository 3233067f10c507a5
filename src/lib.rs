//! Skyscape - An ambient sky simulation
//!
//! Birds perch and chase, clouds drift and fade, stars fall, and now and
//! then a visitor wanders across dropping things. Every entity runs its
//! own state machine; the [`Sky`] decides when things appear.

pub mod config;
pub mod world;
pub mod entities;
pub mod sky;
pub mod render;
pub mod ui;

// Re-export commonly used types
pub use config::{ConfigError, SkyConfig};
pub use sky::{Census, Sky, SkyEvent};
pub use world::{Boundary, Vec2, Viewport};
