use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::narration::engine::{SpeechEngine, SpeechEvent, Utterance};
use crate::narration::espeak::CommandSpeechEngine;
use crate::narration::voice::{VoiceCatalog, VoiceMatch, select_voice};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

const EVENT_POLL: Duration = Duration::from_millis(20);

/// Parameters for one [`Narrator::speak`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct SpeechOptions {
    /// Language tag used for voice selection.
    pub language: String,
    /// Speaking rate, clamped to `0.1..=10`.
    pub rate: f32,
    /// Pitch, clamped to `0..=2`.
    pub pitch: f32,
    /// Volume, clamped to `0..=1`.
    pub volume: f32,
    /// Preferred voice name.
    pub voice: Option<String>,
    /// Longest time an utterance may play, not counting time spent paused.
    pub timeout: Duration,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: "en-US".to_owned(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
            timeout: Duration::from_secs(300),
        }
    }
}

impl SpeechOptions {
    /// Return options with a different language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Return options preferring a named voice.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    /// Return options with a different rate.
    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    /// Return options with a different timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn clamped(&self) -> (f32, f32, f32) {
        (
            clamp_or(self.rate, 0.1, 10.0, 1.0),
            clamp_or(self.pitch, 0.0, 2.0, 1.0),
            clamp_or(self.volume, 0.0, 1.0, 1.0),
        )
    }
}

fn clamp_or(v: f32, lo: f32, hi: f32, fallback: f32) -> f32 {
    if v.is_nan() { fallback } else { v.clamp(lo, hi) }
}

/// How a `speak` call ended without error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Spoken to the end.
    Completed,
    /// Cut short by [`Narrator::stop`] or by a newer `speak` call.
    Cancelled,
}

#[derive(Debug, Default)]
struct Active {
    cancelled: AtomicBool,
    paused: AtomicBool,
}

/// Speaks scene narration through an injected engine.
///
/// `speak` blocks until the utterance ends; other threads may call `stop`, `pause` and `resume`
/// meanwhile. Narration is independent of video generation and never touches its state.
pub struct Narrator {
    engine: Arc<dyn SpeechEngine>,
    catalog: Arc<dyn VoiceCatalog>,
    active: Mutex<Option<Arc<Active>>>,
}

impl std::fmt::Debug for Narrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Narrator")
            .field("speaking", &self.is_speaking())
            .finish_non_exhaustive()
    }
}

impl Narrator {
    /// Create a narrator over `engine`, selecting voices from `catalog`.
    pub fn new(engine: Arc<dyn SpeechEngine>, catalog: Arc<dyn VoiceCatalog>) -> Self {
        Self {
            engine,
            catalog,
            active: Mutex::new(None),
        }
    }

    /// Narrator driving the system `espeak-ng`, which also serves as the voice catalog.
    pub fn espeak() -> Self {
        let engine = Arc::new(CommandSpeechEngine::default());
        Self::new(engine.clone(), engine)
    }

    /// Speak `text` and block until it finishes, is cancelled, fails or times out.
    #[tracing::instrument(skip_all, fields(chars = text.len(), lang = %opts.language))]
    pub fn speak(&self, text: &str, opts: &SpeechOptions) -> TrainreelResult<SpeechOutcome> {
        if text.trim().is_empty() {
            return Ok(SpeechOutcome::Completed);
        }

        let voices = self.catalog.voices().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "voice listing failed; using engine default");
            Vec::new()
        });
        let (voice, matched) = select_voice(&voices, opts.voice.as_deref(), &opts.language);
        if matched == VoiceMatch::EngineDefault
            || (opts.voice.is_some() && matched != VoiceMatch::Name)
        {
            tracing::warn!(
                requested = ?opts.voice,
                ?matched,
                "requested voice unavailable; falling back"
            );
        }

        let (rate, pitch, volume) = opts.clamped();
        let utterance = Utterance {
            text: text.to_owned(),
            lang: opts.language.clone(),
            voice: voice.cloned(),
            rate,
            pitch,
            volume,
        };

        let active = Arc::new(Active::default());
        let previous = self.slot().replace(active.clone());
        if let Some(prev) = previous {
            prev.cancelled.store(true, Ordering::Release);
            self.engine.stop();
        }
        let result = self.play(&utterance, &active, opts.timeout);

        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|a| Arc::ptr_eq(a, &active)) {
            *slot = None;
        }
        result
    }

    fn play(
        &self,
        utterance: &Utterance,
        active: &Active,
        timeout: Duration,
    ) -> TrainreelResult<SpeechOutcome> {
        let (tx, rx) = mpsc::channel();
        self.engine.speak(utterance, tx)?;
        // A stop that landed while the engine was starting found nothing to cancel.
        if active.cancelled.load(Ordering::Acquire) {
            self.stop_if_current(active);
        }

        let mut played = Duration::ZERO;
        loop {
            match rx.recv_timeout(EVENT_POLL) {
                Ok(SpeechEvent::Started) => {}
                Ok(SpeechEvent::Finished) => {
                    return Ok(if active.cancelled.load(Ordering::Acquire) {
                        SpeechOutcome::Cancelled
                    } else {
                        SpeechOutcome::Completed
                    });
                }
                Ok(SpeechEvent::Interrupted) => return Ok(SpeechOutcome::Cancelled),
                Ok(SpeechEvent::Error(msg)) => {
                    if active.cancelled.load(Ordering::Acquire) {
                        return Ok(SpeechOutcome::Cancelled);
                    }
                    return Err(TrainreelError::speech(msg));
                }
                Err(RecvTimeoutError::Timeout) => {
                    if active.cancelled.load(Ordering::Acquire) && !self.stop_if_current(active) {
                        return Ok(SpeechOutcome::Cancelled);
                    }
                    if !active.paused.load(Ordering::Acquire) {
                        played += EVENT_POLL;
                    }
                    if played >= timeout {
                        self.engine.stop();
                        return Err(TrainreelError::timeout("speech utterance", timeout));
                    }
                }
                Err(RecvTimeoutError::Disconnected) => {
                    if active.cancelled.load(Ordering::Acquire) {
                        return Ok(SpeechOutcome::Cancelled);
                    }
                    return Err(TrainreelError::speech(
                        "speech engine dropped the utterance without a result",
                    ));
                }
            }
        }
    }

    /// Re-issue `engine.stop()` for `active` unless a newer utterance has replaced it.
    fn stop_if_current(&self, active: &Active) -> bool {
        let current = self
            .slot()
            .as_ref()
            .is_some_and(|a| std::ptr::eq(Arc::as_ptr(a), active));
        if current {
            self.engine.stop();
        }
        current
    }

    /// Cancel the in-flight utterance; its `speak` call returns [`SpeechOutcome::Cancelled`].
    pub fn stop(&self) {
        let Some(active) = self.slot().clone() else {
            return;
        };
        active.cancelled.store(true, Ordering::Release);
        self.engine.stop();
    }

    /// Suspend the in-flight utterance.
    pub fn pause(&self) {
        if let Some(active) = self.slot().as_ref() {
            active.paused.store(true, Ordering::Release);
            self.engine.pause();
        }
    }

    /// Continue a paused utterance.
    pub fn resume(&self) {
        if let Some(active) = self.slot().as_ref() {
            active.paused.store(false, Ordering::Release);
            self.engine.resume();
        }
    }

    /// `true` while a `speak` call is in flight.
    pub fn is_speaking(&self) -> bool {
        self.slot().is_some()
    }

    /// `true` while the in-flight utterance is paused.
    pub fn is_paused(&self) -> bool {
        self.slot()
            .as_ref()
            .is_some_and(|a| a.paused.load(Ordering::Acquire))
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<Active>>> {
        self.active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/narration/narrator.rs"]
mod tests;
