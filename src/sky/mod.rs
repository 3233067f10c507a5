//! Sky module - the simulation core
//!
//! Spawn timing, cloud pooling, and the world that ties entities together.

mod pool;
mod spawner;
mod state;
mod timer;

pub use pool::Pool;
pub use spawner::{SpawnPlan, SpawnRequest, Spawner};
pub use state::{Census, Sky, SkyEvent};
pub use timer::{FadeIn, SpawnTimer};
