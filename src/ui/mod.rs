//! User Interface module
//!
//! Terminal viewer for the sky using ratatui.

pub mod app;
pub mod raster;

pub use app::App;
