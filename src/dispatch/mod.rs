//! Plugin dispatch and result rendering.

/// Resolve, open, run and render loop
pub mod dispatcher;

/// Human and machine output selection
pub mod render;

pub use dispatcher::{DispatchSummary, Dispatcher};
pub use render::OutputMode;
