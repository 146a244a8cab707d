use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] at the start of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Total frames the producer intends to push.
    pub total_frames: u64,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order. A sink
/// that can no longer accept frames returns [`TrainreelError::SinkClosed`]; frames accepted
/// before that stay valid.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> TrainreelResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrainreelResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> TrainreelResult<()>;
    /// Tear down without producing output. Must be safe to call at any time, repeatedly.
    fn abort(&mut self) {}
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// `true` once `end` has been called for the current run.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> TrainreelResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrainreelResult<()> {
        if self.cfg.is_none() || self.ended {
            return Err(TrainreelError::sink_closed("in-memory sink is not accepting frames"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(TrainreelError::encoding("in-memory sink received out-of-order frame index"));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> TrainreelResult<()> {
        self.ended = true;
        Ok(())
    }

    fn abort(&mut self) {
        self.frames.clear();
        self.ended = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
