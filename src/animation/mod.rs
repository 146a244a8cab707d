//! Scene animation curves and timing.

/// Easing curves.
pub mod ease;
/// Per-progress scene animation state.
pub mod timeline;
