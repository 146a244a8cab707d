//! Scene inputs and per-run render configuration.

/// Scene value type and frame accounting.
pub mod model;
/// Render options (canvas, fps, palette, font, bitrate).
pub mod options;
/// JSON script boundary object (`options` + `scenes`).
pub mod script;
