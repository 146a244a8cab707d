//! Narration playback through a pluggable text-to-speech engine.
//!
//! Narration runs independently of video generation; it is never muxed into the video.

/// Speech engine contract.
pub mod engine;
/// `espeak-ng` command line engine.
pub mod espeak;
/// Blocking [`narrator::Narrator`] with cancellation and timeouts.
pub mod narrator;
/// Voices and voice selection.
pub mod voice;
