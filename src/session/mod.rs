//! Generation sessions: pacing, per-scene scheduling and the caller-facing facade.

/// Frame pacing clocks.
pub mod clock;
/// [`generator::VideoGenerator`], the caller-facing API.
pub mod generator;
/// Per-scene frame loop.
pub mod scheduler;
