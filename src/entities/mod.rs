//! Sky entities and their state machines

pub mod common;
pub mod bird;
pub mod cloud;
pub mod star;
pub mod roamer;
pub mod dropped_item;

pub use common::{lerp, Appearance, EntityKind, Facing, Step};
pub use bird::{Bird, BirdEvent, BirdState};
pub use cloud::{Cloud, CloudEvent, CloudState, CloudVariant};
pub use star::{Star, StarEvent, StarState};
pub use roamer::{DropRequest, Roamer, RoamerState};
pub use dropped_item::DroppedItem;
