//! trainreel renders synthetic training videos.
//!
//! A caller supplies an ordered list of [`Scene`]s. Each scene is animated frame by frame on the
//! CPU, streamed into the system `ffmpeg` and returned as one VP9/WebM [`VideoBlob`]. The same
//! renderer produces PNG thumbnails and single-frame previews. Narration is spoken separately
//! through a pluggable [`SpeechEngine`].
//!
//! - Load a [`VideoScript`] or build [`Scene`]s directly
//! - Create a [`VideoGenerator`] from [`RenderOptions`]
//! - Call [`VideoGenerator::generate_video`], or stream into any [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Easing curves and the per-progress scene timeline.
pub mod animation;
/// Encoding sinks and the finished video blob.
pub mod encode;
/// Narration playback.
pub mod narration;
/// Frame rendering.
pub mod render;
/// Scene inputs and options.
pub mod scene;
/// Generation sessions.
pub mod session;

pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Rgba8, Rgba8Premul};
pub use crate::foundation::error::{TrainreelError, TrainreelResult};

pub use crate::animation::timeline::FrameState;
pub use crate::encode::blob::VideoBlob;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::encode::webm::{WebmSink, WebmSinkOpts, is_ffmpeg_on_path};
pub use crate::narration::engine::{SpeechEngine, SpeechEvent, Utterance};
pub use crate::narration::espeak::CommandSpeechEngine;
pub use crate::narration::narrator::{Narrator, SpeechOptions, SpeechOutcome};
pub use crate::narration::voice::{StaticVoiceCatalog, Voice, VoiceCatalog};
pub use crate::render::backend::FrameRGBA;
pub use crate::render::cpu::SceneRenderer;
pub use crate::render::target::RenderTarget;
pub use crate::scene::model::Scene;
pub use crate::scene::options::{FontSource, RenderOptions};
pub use crate::scene::script::VideoScript;
pub use crate::session::clock::{FrameClock, Pacing, RealtimeClock, UnpacedClock};
pub use crate::session::generator::{GeneratorOpts, RenderStats, VideoGenerator};
