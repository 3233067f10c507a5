//! World module
//!
//! Sky-space geometry: vectors, viewport bounds, and perches.

pub mod vec2;
pub mod viewport;
pub mod perch;

pub use vec2::Vec2;
pub use viewport::{Boundary, Edge, Viewport};
pub use perch::{Perch, PerchId, PerchSet};
