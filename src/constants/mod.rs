//! Viewer constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! These are also the defaults that `ViewerConfig` falls back to.

mod input;
mod render;
mod ui;
mod viewport;

pub use input::*;
pub use render::*;
pub use ui::*;
pub use viewport::*;
