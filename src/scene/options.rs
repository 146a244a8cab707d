use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{TrainreelError, TrainreelResult};
use std::path::PathBuf;

/// Default output bitrate for the WebM encoder, in kbit/s.
pub const DEFAULT_BITRATE_KBPS: u32 = 5_000;

/// Where the renderer gets its typeface from.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSource {
    /// Generic `sans-serif` from the system font collection.
    #[default]
    System,
    /// A TrueType/OpenType file on disk.
    File(PathBuf),
}

/// Immutable configuration for one generation run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frame rate.
    #[serde(deserialize_with = "de_fps")]
    pub fps: Fps,
    /// Base color of the background gradient.
    pub background_color: Rgba8,
    /// Accent used for the title underline, panel border and bullet markers.
    pub primary_color: Rgba8,
    /// Second accent used for decorations and the gradient tail.
    pub secondary_color: Rgba8,
    /// Typeface for all text.
    pub font: FontSource,
    /// Target video bitrate in kbit/s.
    pub bitrate_kbps: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: Fps { num: 30, den: 1 },
            background_color: Rgba8::rgb(0x0f, 0x17, 0x2a),
            primary_color: Rgba8::rgb(0x3b, 0x82, 0xf6),
            secondary_color: Rgba8::rgb(0x8b, 0x5c, 0xf6),
            font: FontSource::System,
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
        }
    }
}

impl RenderOptions {
    /// Return options with a different canvas size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Return options with a different frame rate.
    pub fn with_fps(mut self, fps: Fps) -> Self {
        self.fps = fps;
        self
    }

    /// Return options with a different font source.
    pub fn with_font(mut self, font: FontSource) -> Self {
        self.font = font;
        self
    }

    /// Validated canvas for these options.
    pub fn canvas(&self) -> TrainreelResult<Canvas> {
        Canvas::new(self.width, self.height)
    }

    /// Validate all fields.
    pub fn validate(&self) -> TrainreelResult<()> {
        self.canvas()?;
        Fps::new(self.fps.num, self.fps.den)?;
        if self.bitrate_kbps == 0 {
            return Err(TrainreelError::validation("bitrate_kbps must be > 0"));
        }
        Ok(())
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum FpsDef {
    Whole(u32),
    Rational { num: u32, den: u32 },
}

fn de_fps<'de, D>(d: D) -> Result<Fps, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize as _;
    use serde::de::Error as _;

    let (num, den) = match FpsDef::deserialize(d)? {
        FpsDef::Whole(n) => (n, 1),
        FpsDef::Rational { num, den } => (num, den),
    };
    Fps::new(num, den).map_err(D::Error::custom)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/options.rs"]
mod tests;
