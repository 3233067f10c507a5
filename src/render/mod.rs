//! Rendering abstraction layer
//!
//! The simulation pushes appearances through [`Presenter`]; hosts decide
//! how to draw them.

pub mod presenter;

pub use presenter::{Presenter, Sprite, SpriteFrame};
