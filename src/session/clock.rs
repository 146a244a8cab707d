use crate::foundation::core::Fps;
use std::time::{Duration, Instant};

/// The per-frame suspension point of the scheduler.
///
/// `wait_next_frame` is called once after every pushed frame, the way a browser yields to the
/// next display refresh.
pub trait FrameClock: Send {
    /// Reset the cadence anchor to "now".
    fn start(&mut self) {}
    /// Block until the next frame slot.
    fn wait_next_frame(&mut self);
}

/// Paces frames at the fps cadence.
///
/// Deadlines are absolute, so short render hiccups are absorbed. When a frame overruns its slot
/// the cadence re-anchors instead of bursting to catch up.
#[derive(Debug)]
pub struct RealtimeClock {
    frame: Duration,
    next: Option<Instant>,
}

impl RealtimeClock {
    /// Create a clock ticking at `fps`.
    pub fn new(fps: Fps) -> Self {
        Self {
            frame: Duration::from_secs_f64(fps.frame_duration_secs()),
            next: None,
        }
    }

    /// Length of one frame slot.
    pub fn frame_duration(&self) -> Duration {
        self.frame
    }
}

impl FrameClock for RealtimeClock {
    fn start(&mut self) {
        self.next = Some(Instant::now());
    }

    fn wait_next_frame(&mut self) {
        let now = Instant::now();
        let deadline = self.next.unwrap_or(now) + self.frame;
        if deadline > now {
            std::thread::sleep(deadline - now);
            self.next = Some(deadline);
        } else {
            self.next = Some(now);
        }
    }
}

/// Never sleeps; counts ticks. Used for offline rendering and tests.
#[derive(Debug, Default)]
pub struct UnpacedClock {
    ticks: u64,
}

impl UnpacedClock {
    /// Create a new unpaced clock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `wait_next_frame` calls since `start`.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl FrameClock for UnpacedClock {
    fn start(&mut self) {
        self.ticks = 0;
    }

    fn wait_next_frame(&mut self) {
        self.ticks += 1;
    }
}

/// How generation is paced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// One frame per `1/fps` seconds of wall-clock time.
    #[default]
    Realtime,
    /// As fast as frames render.
    Unpaced,
}

impl Pacing {
    /// Build the clock for this pacing mode.
    pub fn clock(self, fps: Fps) -> Box<dyn FrameClock> {
        match self {
            Self::Realtime => Box::new(RealtimeClock::new(fps)),
            Self::Unpaced => Box::new(UnpacedClock::new()),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/clock.rs"]
mod tests;
