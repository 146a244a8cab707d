use crate::encode::sink::FrameSink;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::render::cpu::SceneRenderer;
use crate::render::target::RenderTarget;
use crate::scene::model::Scene;
use crate::session::clock::FrameClock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flags shared between a running session and its owner.
///
/// `stop` ends capture early and keeps what was captured. `abort` discards the run.
#[derive(Debug, Default)]
pub struct SessionControl {
    stop: AtomicBool,
    abort: AtomicBool,
}

impl SessionControl {
    /// Create a fresh control with no flags raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the session to stop after the current frame and finalize.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Ask the session to stop after the current frame and discard its output.
    pub fn request_abort(&self) {
        self.abort.store(true, Ordering::Release);
    }

    /// `true` once a stop was requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }

    /// `true` once an abort was requested.
    pub fn is_aborted(&self) -> bool {
        self.abort.load(Ordering::Acquire)
    }

    fn should_halt(&self) -> bool {
        self.is_stop_requested() || self.is_aborted()
    }
}

/// Result of driving one scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneOutcome {
    /// Frames pushed into the sink.
    pub frames: u64,
    /// The scene ended before its last frame (stop request or closed sink).
    pub stopped_early: bool,
}

/// Progress fraction of `frame` within a scene of `total` frames, in `[0, 1)`.
pub fn frame_progress(frame: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    frame as f64 / total as f64
}

/// Render every frame of `scene` into `sink`, starting at timeline index `first`.
///
/// Yields to `clock` once after each pushed frame. A sink that reports
/// [`TrainreelError::SinkClosed`] ends the scene early; frames already pushed stay intact.
#[allow(clippy::too_many_arguments)]
pub fn render_scene(
    renderer: &mut SceneRenderer,
    target: &mut RenderTarget,
    scene: &Scene,
    fps: Fps,
    first: FrameIndex,
    sink: &mut dyn FrameSink,
    clock: &mut dyn FrameClock,
    control: Option<&SessionControl>,
) -> TrainreelResult<SceneOutcome> {
    let total = scene.frame_count(fps);
    if total == 0 {
        tracing::warn!(title = %scene.title, duration = scene.duration, "scene has no frames");
        return Ok(SceneOutcome::default());
    }

    let mut outcome = SceneOutcome::default();
    for frame in 0..total {
        if control.is_some_and(SessionControl::should_halt) {
            outcome.stopped_early = true;
            break;
        }

        let pixels = renderer.render_frame(target, scene, frame_progress(frame, total))?;
        match sink.push_frame(FrameIndex(first.0 + frame), &pixels) {
            Ok(()) => outcome.frames += 1,
            Err(TrainreelError::SinkClosed(reason)) => {
                tracing::debug!(%reason, frame, "sink closed; ending scene early");
                outcome.stopped_early = true;
                break;
            }
            Err(e) => return Err(e),
        }
        clock.wait_next_frame();
    }

    Ok(outcome)
}

#[cfg(test)]
#[path = "../../tests/unit/session/scheduler.rs"]
mod tests;
