//! Configuration
//!
//! Tunable simulation settings, their validation, and RON file loading.

pub mod error;
pub mod loader;
pub mod settings;

pub use error::ConfigError;
pub use loader::{default_config_path, export_config, load_config};
pub use settings::{
    BirdConfig, CloudConfig, DroppedItemConfig, Interval, MusicConfig, PerchPolicy,
    RoamerConfig, SkyConfig, Span, StarConfig,
};
