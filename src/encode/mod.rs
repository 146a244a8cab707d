//! Encoding sinks.
//!
//! Sinks consume rendered frames in timeline order. The WebM sink streams them into the system
//! `ffmpeg` and hands back one in-memory [`blob::VideoBlob`].

/// Finished video artifact.
pub mod blob;
/// Generic frame sink trait and built-in sinks.
pub mod sink;
/// `ffmpeg`-based VP9/WebM sink.
pub mod webm;
