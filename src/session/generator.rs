use crate::animation::timeline::FADE_OUT_START;
use crate::encode::blob::VideoBlob;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::encode::webm::{WebmSink, WebmSinkOpts, check_frame_size};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::render::cpu::SceneRenderer;
use crate::render::target::RenderTarget;
use crate::render::thumbnail::png_data_uri;
use crate::scene::model::{Scene, total_frames};
use crate::scene::options::RenderOptions;
use crate::session::clock::{FrameClock, Pacing};
use crate::session::scheduler::{SessionControl, render_scene};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Options controlling [`VideoGenerator`] behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorOpts {
    /// Frame pacing for full generation.
    pub pacing: Pacing,
    /// Maximum time the encoder may take to flush after the last frame.
    pub finalize_timeout: Duration,
    /// Scene progress rendered by `generate_thumbnail`.
    pub thumbnail_progress: f64,
    /// Scene progress rendered by `generate_preview`.
    pub preview_progress: f64,
}

impl Default for GeneratorOpts {
    fn default() -> Self {
        Self {
            pacing: Pacing::Realtime,
            finalize_timeout: Duration::from_secs(120),
            thumbnail_progress: FADE_OUT_START - 0.01,
            preview_progress: 0.5,
        }
    }
}

impl GeneratorOpts {
    /// Return options with a different pacing mode.
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Return options with a different finalize timeout.
    pub fn with_finalize_timeout(mut self, timeout: Duration) -> Self {
        self.finalize_timeout = timeout;
        self
    }
}

/// Counters for one generation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Scenes visited.
    pub scenes: usize,
    /// Frames the script asks for.
    pub frames_total: u64,
    /// Frames pushed into the sink.
    pub frames_rendered: u64,
    /// The run ended before its last frame.
    pub stopped_early: bool,
}

/// Caller-facing facade over the renderer, scheduler and encoder.
///
/// Every call builds its own [`SceneRenderer`] and [`RenderTarget`], so previews, thumbnails
/// and full runs can proceed concurrently on one generator.
#[derive(Debug)]
pub struct VideoGenerator {
    options: RenderOptions,
    opts: GeneratorOpts,
    active: Mutex<Vec<Arc<SessionControl>>>,
}

impl VideoGenerator {
    /// Create a generator after validating `options`.
    pub fn new(options: RenderOptions, opts: GeneratorOpts) -> TrainreelResult<Self> {
        options.validate()?;
        Ok(Self {
            options,
            opts,
            active: Mutex::new(Vec::new()),
        })
    }

    /// Render options used for every call.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Generator behavior options.
    pub fn generator_opts(&self) -> &GeneratorOpts {
        &self.opts
    }

    /// Render all scenes in order into one WebM video.
    ///
    /// Opens a single encoder session for the whole sequence. No partial blob is ever returned:
    /// on any failure the encoder is killed and its output discarded. Sizes the encoder cannot
    /// take (odd width or height) are rejected before anything is rendered.
    #[tracing::instrument(skip_all, fields(scenes = scenes.len()))]
    pub fn generate_video(&self, scenes: &[Scene]) -> TrainreelResult<VideoBlob> {
        check_frame_size(self.options.width, self.options.height)?;
        let mut sink = WebmSink::new(WebmSinkOpts {
            bitrate_kbps: self.options.bitrate_kbps,
            bg_rgba: self.options.background_color.to_array(),
            finalize_timeout: self.opts.finalize_timeout,
            ..WebmSinkOpts::default()
        });
        let stats = self.render_to_sink(scenes, &mut sink)?;
        let blob = sink
            .take_blob()
            .ok_or_else(|| TrainreelError::encoding("encoder produced no output"))?;
        tracing::info!(
            frames = stats.frames_rendered,
            bytes = blob.len(),
            "video generated"
        );
        Ok(blob)
    }

    /// Drive every scene through the scheduler into `sink`, paced by the configured clock.
    pub fn render_to_sink(
        &self,
        scenes: &[Scene],
        sink: &mut dyn FrameSink,
    ) -> TrainreelResult<RenderStats> {
        let mut clock = self.opts.pacing.clock(self.options.fps);
        self.render_to_sink_with_clock(scenes, sink, clock.as_mut())
    }

    /// Like [`render_to_sink`](Self::render_to_sink) with an explicit clock.
    pub fn render_to_sink_with_clock(
        &self,
        scenes: &[Scene],
        sink: &mut dyn FrameSink,
        clock: &mut dyn FrameClock,
    ) -> TrainreelResult<RenderStats> {
        let control = ActiveSession::register(self);
        match self.run_session(scenes, sink, clock, &control.control) {
            Ok(stats) => Ok(stats),
            Err(e) => {
                sink.abort();
                Err(e)
            }
        }
    }

    fn run_session(
        &self,
        scenes: &[Scene],
        sink: &mut dyn FrameSink,
        clock: &mut dyn FrameClock,
        control: &SessionControl,
    ) -> TrainreelResult<RenderStats> {
        let fps = self.options.fps;
        let mut renderer = SceneRenderer::new(&self.options)?;
        let mut target = RenderTarget::new(self.options.width, self.options.height)?;

        let mut stats = RenderStats {
            frames_total: total_frames(scenes, fps),
            ..RenderStats::default()
        };
        sink.begin(SinkConfig {
            width: self.options.width,
            height: self.options.height,
            fps,
            total_frames: stats.frames_total,
        })?;
        clock.start();

        for (i, scene) in scenes.iter().enumerate() {
            tracing::debug!(scene = i, title = %scene.title, duration = scene.duration, "rendering scene");
            let outcome = render_scene(
                &mut renderer,
                &mut target,
                scene,
                fps,
                FrameIndex(stats.frames_rendered),
                sink,
                clock,
                Some(control),
            )?;
            stats.scenes += 1;
            stats.frames_rendered += outcome.frames;
            if outcome.stopped_early {
                stats.stopped_early = true;
                break;
            }
        }

        if control.is_aborted() {
            return Err(TrainreelError::sink_closed("generation cancelled by cleanup"));
        }
        sink.end()?;
        Ok(stats)
    }

    /// Render `scene` near the end of its animation and return a PNG data URI.
    ///
    /// The frame is taken just before the fade-out, with the content fully revealed.
    pub fn generate_thumbnail(&self, scene: &Scene) -> TrainreelResult<String> {
        let mut renderer = SceneRenderer::new(&self.options)?;
        let mut target = RenderTarget::new(self.options.width, self.options.height)?;
        let frame = renderer.render_frame(&mut target, scene, self.opts.thumbnail_progress)?;
        png_data_uri(&frame)
    }

    /// Render one still of `scene` into a caller-owned target.
    pub fn generate_preview(&self, target: &mut RenderTarget, scene: &Scene) -> TrainreelResult<()> {
        let mut renderer = SceneRenderer::new(&self.options)?;
        renderer.render(target, scene, self.opts.preview_progress)
    }

    /// End every running capture after its current frame and finalize what was captured.
    pub fn stop_capture(&self) {
        for control in self.active_sessions().iter() {
            control.request_stop();
        }
    }

    /// Abort every running session and discard its output. Safe to call any number of times.
    pub fn cleanup(&self) {
        let sessions = self.active_sessions();
        if sessions.is_empty() {
            return;
        }
        tracing::debug!(sessions = sessions.len(), "aborting active sessions");
        for control in sessions.iter() {
            control.request_abort();
        }
    }

    /// `true` while at least one session is rendering.
    pub fn is_busy(&self) -> bool {
        !self.active_sessions().is_empty()
    }

    fn active_sessions(&self) -> MutexGuard<'_, Vec<Arc<SessionControl>>> {
        self.active
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

struct ActiveSession<'a> {
    owner: &'a VideoGenerator,
    control: Arc<SessionControl>,
}

impl<'a> ActiveSession<'a> {
    fn register(owner: &'a VideoGenerator) -> Self {
        let control = Arc::new(SessionControl::new());
        owner.active_sessions().push(control.clone());
        Self { owner, control }
    }
}

impl Drop for ActiveSession<'_> {
    fn drop(&mut self) {
        self.owner
            .active_sessions()
            .retain(|c| !Arc::ptr_eq(c, &self.control));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/generator.rs"]
mod tests;
