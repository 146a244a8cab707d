use crate::encode::blob::VideoBlob;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::foundation::math::mul_div255_u16;
use crate::render::backend::FrameRGBA;
use crate::scene::options::DEFAULT_BITRATE_KBPS;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const WAIT_POLL: Duration = Duration::from_millis(10);

static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Options for [`WebmSink`].
#[derive(Clone, Debug)]
pub struct WebmSinkOpts {
    /// Target VP9 bitrate in kbit/s.
    pub bitrate_kbps: u32,
    /// Background color used to flatten alpha (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Maximum time to wait for `ffmpeg` to flush after the last frame.
    pub finalize_timeout: Duration,
    /// `ffmpeg` executable name or path.
    pub ffmpeg: PathBuf,
}

impl Default for WebmSinkOpts {
    fn default() -> Self {
        Self {
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            bg_rgba: [0, 0, 0, 255],
            finalize_timeout: Duration::from_secs(120),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

impl WebmSinkOpts {
    /// Return options with a different bitrate.
    pub fn with_bitrate_kbps(mut self, kbps: u32) -> Self {
        self.bitrate_kbps = kbps;
        self
    }

    /// Return options with a different finalize timeout.
    pub fn with_finalize_timeout(mut self, timeout: Duration) -> Self {
        self.finalize_timeout = timeout;
        self
    }

    /// Return options pointing at a specific `ffmpeg` binary.
    pub fn with_ffmpeg(mut self, ffmpeg: impl Into<PathBuf>) -> Self {
        self.ffmpeg = ffmpeg.into();
        self
    }
}

/// Sink that spawns the system `ffmpeg`, streams raw frames to stdin and encodes VP9 in WebM.
///
/// Output goes to a private temp file which is read back into a [`VideoBlob`] once `ffmpeg`
/// exits cleanly. Aborted or failed runs never expose partial output.
pub struct WebmSink {
    opts: WebmSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    out: TempFileGuard,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
    blob: Option<VideoBlob>,
}

impl WebmSink {
    /// Create a new sink; nothing is spawned until `begin`.
    pub fn new(opts: WebmSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            out: TempFileGuard(None),
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
            blob: None,
        }
    }

    /// Take the finished blob produced by the last successful `end`.
    pub fn take_blob(&mut self) -> Option<VideoBlob> {
        self.blob.take()
    }

    /// `true` while an `ffmpeg` process is attached.
    pub fn is_active(&self) -> bool {
        self.child.is_some()
    }

    fn command(&self, cfg: &SinkConfig, out: &Path) -> Command {
        let mut cmd = Command::new(&self.opts.ffmpeg);
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Input: raw RGBA8 frames, flattened to opaque in `push_frame`.
        cmd.args([
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);

        cmd.args([
            "-an",
            "-c:v",
            "libvpx-vp9",
            "-b:v",
            &format!("{}k", self.opts.bitrate_kbps),
            "-pix_fmt",
            "yuv420p",
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-f",
            "webm",
        ])
        .arg(out);
        cmd
    }

    fn wait_with_deadline(&mut self, mut child: Child) -> TrainreelResult<ExitStatus> {
        let deadline = Instant::now() + self.opts.finalize_timeout;
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(TrainreelError::timeout(
                        "ffmpeg finalize",
                        self.opts.finalize_timeout,
                    ));
                }
                Ok(None) => std::thread::sleep(WAIT_POLL),
                Err(e) => {
                    return Err(TrainreelError::encoding(format!(
                        "failed to wait for ffmpeg to finish: {e}"
                    )));
                }
            }
        }
    }

    fn join_stderr(&mut self) -> Vec<u8> {
        match self.stderr_drain.take() {
            Some(handle) => handle.join().ok().and_then(Result::ok).unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

impl FrameSink for WebmSink {
    fn begin(&mut self, cfg: SinkConfig) -> TrainreelResult<()> {
        if self.child.is_some() {
            return Err(TrainreelError::encoding("webm sink already started"));
        }
        if cfg.fps.num == 0 || cfg.fps.den == 0 {
            return Err(TrainreelError::validation("fps must be non-zero"));
        }
        check_frame_size(cfg.width, cfg.height)?;
        if self.opts.bitrate_kbps == 0 {
            return Err(TrainreelError::validation("bitrate_kbps must be > 0"));
        }

        if !ffmpeg_has_encoder(&self.opts.ffmpeg, "libvpx-vp9") {
            return Err(TrainreelError::encoding_unavailable(format!(
                "'{}' with the libvpx-vp9 encoder is required for WebM output",
                self.opts.ffmpeg.display()
            )));
        }

        let out = temp_output_path("webm");
        let mut child = self.command(&cfg, &out).spawn().map_err(|e| {
            TrainreelError::encoding_unavailable(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        self.out = TempFileGuard(Some(out));

        let stdin = child.stdin.take().ok_or_else(|| {
            TrainreelError::encoding_unavailable("failed to open ffmpeg stdin (unexpected)")
        })?;
        let mut stderr = child.stderr.take().ok_or_else(|| {
            TrainreelError::encoding_unavailable("failed to open ffmpeg stderr (unexpected)")
        })?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        tracing::debug!(
            width = cfg.width,
            height = cfg.height,
            fps = cfg.fps.as_f64(),
            bitrate_kbps = self.opts.bitrate_kbps,
            "ffmpeg webm encoder started"
        );

        self.scratch = vec![0u8; (cfg.width as usize) * (cfg.height as usize) * 4];
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        self.blob = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TrainreelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| TrainreelError::sink_closed("webm sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(TrainreelError::encoding(
                "webm sink received out-of-order frame index",
            ));
        }

        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(TrainreelError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        if frame.data.len() != self.scratch.len() {
            return Err(TrainreelError::validation(
                "frame.data size mismatch with width*height*4",
            ));
        }

        flatten_to_opaque_rgba8(
            &mut self.scratch,
            &frame.data,
            frame.premultiplied,
            self.opts.bg_rgba,
        )?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(TrainreelError::sink_closed("webm sink is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            if e.kind() == std::io::ErrorKind::BrokenPipe {
                TrainreelError::sink_closed("ffmpeg closed its input")
            } else {
                TrainreelError::encoding(format!("failed to write frame to ffmpeg stdin: {e}"))
            }
        })?;
        self.last_idx = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> TrainreelResult<()> {
        drop(self.stdin.take());
        let child = self
            .child
            .take()
            .ok_or_else(|| TrainreelError::encoding("webm sink not started"))?;

        let status = match self.wait_with_deadline(child) {
            Ok(status) => status,
            Err(e) => {
                self.abort();
                return Err(e);
            }
        };
        let stderr_bytes = self.join_stderr();
        self.cfg = None;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            self.out.remove();
            return Err(TrainreelError::encoding(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        let path = self
            .out
            .0
            .clone()
            .ok_or_else(|| TrainreelError::encoding("webm output path missing"))?;
        let bytes = std::fs::read(&path).map_err(|e| {
            TrainreelError::encoding(format!("failed to read encoded video '{}': {e}", path.display()))
        })?;
        self.out.remove();

        tracing::debug!(bytes = bytes.len(), "ffmpeg webm encoder finished");
        self.blob = Some(VideoBlob::webm(bytes));
        Ok(())
    }

    fn abort(&mut self) {
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            tracing::debug!("ffmpeg webm encoder aborted");
        }
        let _ = self.join_stderr();
        self.out.remove();
        self.cfg = None;
        self.blob = None;
    }
}

impl Drop for WebmSink {
    fn drop(&mut self) {
        self.abort();
    }
}

struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    fn remove(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        self.remove();
    }
}

fn temp_output_path(ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "trainreel_{}_{}_{}.{ext}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0),
        TEMP_SEQ.fetch_add(1, Ordering::Relaxed),
    ))
}

fn push_input_fps(cmd: &mut Command, fps: Fps) {
    // For rawvideo input, `-r` goes before `-i`.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

fn flatten_to_opaque_rgba8(
    dst: &mut [u8],
    src: &[u8],
    src_is_premul: bool,
    bg_rgba: [u8; 4],
) -> TrainreelResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TrainreelError::validation(
            "flatten_to_opaque_rgba8 expects equal-length rgba8 buffers",
        ));
    }

    let bg_r = bg_rgba[0] as u16;
    let bg_g = bg_rgba[1] as u16;
    let bg_b = bg_rgba[2] as u16;

    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3] as u16;
        if a == 255 {
            d.copy_from_slice(s);
            continue;
        }

        let inv = 255u16 - a;
        let (r, g, b) = if src_is_premul {
            (
                s[0] as u16 + mul_div255_u16(bg_r, inv),
                s[1] as u16 + mul_div255_u16(bg_g, inv),
                s[2] as u16 + mul_div255_u16(bg_b, inv),
            )
        } else {
            (
                mul_div255_u16(s[0] as u16, a) + mul_div255_u16(bg_r, inv),
                mul_div255_u16(s[1] as u16, a) + mul_div255_u16(bg_g, inv),
                mul_div255_u16(s[2] as u16, a) + mul_div255_u16(bg_b, inv),
            )
        };

        d[0] = r.min(255) as u8;
        d[1] = g.min(255) as u8;
        d[2] = b.min(255) as u8;
        d[3] = 255;
    }

    Ok(())
}

/// Check that `width x height` can be encoded as yuv420p WebM (non-zero, even sides).
pub fn check_frame_size(width: u32, height: u32) -> TrainreelResult<()> {
    if width == 0 || height == 0 {
        return Err(TrainreelError::validation(
            "webm sink width/height must be non-zero",
        ));
    }
    if !width.is_multiple_of(2) || !height.is_multiple_of(2) {
        return Err(TrainreelError::validation(format!(
            "webm output size must be even (required for yuv420p output), got {width}x{height}"
        )));
    }
    Ok(())
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> TrainreelResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Return `true` when `ffmpeg` lists `encoder` among its encoders.
pub fn ffmpeg_has_encoder(ffmpeg: &Path, encoder: &str) -> bool {
    let Ok(output) = Command::new(ffmpeg)
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    else {
        return false;
    };
    output.status.success()
        && String::from_utf8_lossy(&output.stdout)
            .lines()
            .any(|line| line.split_whitespace().nth(1) == Some(encoder))
}

#[cfg(test)]
#[path = "../../tests/unit/encode/webm.rs"]
mod tests;
