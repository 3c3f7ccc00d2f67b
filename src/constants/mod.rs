//! Tuning constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! Constants are split into submodules by domain for easier navigation.

mod layout;
mod physics;
mod render;

pub use layout::*;
pub use physics::*;
pub use render::*;
