use crate::foundation::error::TrainreelResult;
use crate::narration::voice::Voice;
use std::sync::mpsc::Sender;

/// One request to speak, with parameters already clamped.
#[derive(Clone, Debug, PartialEq)]
pub struct Utterance {
    /// Text to speak.
    pub text: String,
    /// Requested language tag.
    pub lang: String,
    /// Selected voice; `None` means the engine default.
    pub voice: Option<Voice>,
    /// Speaking rate, `1.0` is normal.
    pub rate: f32,
    /// Pitch, `1.0` is normal.
    pub pitch: f32,
    /// Volume in `[0, 1]`.
    pub volume: f32,
}

/// Lifecycle events reported by an engine for one utterance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Audio output began.
    Started,
    /// The utterance was spoken to the end.
    Finished,
    /// The utterance was cut short by `stop`.
    Interrupted,
    /// The engine failed mid-utterance.
    Error(String),
}

/// Platform text-to-speech primitive.
///
/// An engine plays one utterance at a time. `speak` returns once playback has started and
/// reports the rest of the lifecycle through `events`; exactly one of `Finished`,
/// `Interrupted` or `Error` ends it. `stop`, `pause` and `resume` act on the current
/// utterance and are no-ops when idle.
pub trait SpeechEngine: Send + Sync {
    /// Start speaking `utterance`.
    fn speak(&self, utterance: &Utterance, events: Sender<SpeechEvent>) -> TrainreelResult<()>;
    /// Cancel the current utterance.
    fn stop(&self);
    /// Suspend the current utterance.
    fn pause(&self);
    /// Continue a suspended utterance.
    fn resume(&self);
}
