//! Frame rasterization.

/// Rendered frame type.
pub mod backend;
/// CPU scene renderer powered by `vello_cpu`.
pub mod cpu;
/// Explicit drawing surface threaded through every render call.
pub mod target;
/// Parley-backed text layout.
pub(crate) mod text;
/// PNG encoding and data-URI helpers.
pub mod thumbnail;
