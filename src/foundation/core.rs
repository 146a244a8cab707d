use crate::foundation::error::{TrainreelError, TrainreelResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Absolute 0-based frame index in video timeline space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    pub den: u32, // must be > 0
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> TrainreelResult<Self> {
        if den == 0 {
            return Err(TrainreelError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(TrainreelError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Whole-number FPS (`num/1`).
    pub fn whole(num: u32) -> TrainreelResult<Self> {
        Self::new(num, 1)
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Duration of one frame in seconds.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Number of whole frames covering `secs` seconds.
    ///
    /// Computed in integers; a trailing partial frame is truncated.
    pub fn frames_for_secs(self, secs: u32) -> u64 {
        if self.den == 0 {
            return 0;
        }
        u64::from(secs) * u64::from(self.num) / u64::from(self.den)
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a validated canvas that fits the rasterizer's `u16` surface limits.
    pub fn new(width: u32, height: u32) -> TrainreelResult<Self> {
        if width == 0 || height == 0 {
            return Err(TrainreelError::validation(
                "canvas width/height must be non-zero",
            ));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(TrainreelError::validation(
                "canvas width/height must fit in u16",
            ));
        }
        Ok(Self { width, height })
    }

    /// Number of bytes in a tightly packed RGBA8 buffer of this size.
    pub fn rgba8_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Straight-alpha RGBA8 color, written as `#rrggbb` or `#rrggbbaa` in scripts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same color with alpha replaced by `alpha` in `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
            ..self
        }
    }

    /// Channel-wise linear mix towards `other` by `t` in `[0, 1]`.
    pub fn mix(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| -> u8 {
            let af = f32::from(a);
            let bf = f32::from(b);
            (af + (bf - af) * t).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
            a: lerp(self.a, other.a),
        }
    }

    /// Convert into premultiplied form.
    pub fn premultiplied(self) -> Rgba8Premul {
        Rgba8Premul::from_straight_rgba(self.r, self.g, self.b, self.a)
    }

    /// Straight RGBA8 byte array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn parse_hex(s: &str) -> TrainreelResult<Self> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| TrainreelError::validation(format!("color '{s}' must start with '#'")))?;
        if !hex.is_ascii() {
            return Err(TrainreelError::validation(format!(
                "color '{s}' must be ascii hex"
            )));
        }

        let byte = |i: usize| -> TrainreelResult<u8> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| TrainreelError::validation(format!("color '{s}' has invalid hex")))
        };
        let nibble = |i: usize| -> TrainreelResult<u8> {
            let v = u8::from_str_radix(&hex[i..i + 1], 16)
                .map_err(|_| TrainreelError::validation(format!("color '{s}' has invalid hex")))?;
            Ok(v * 17)
        };

        match hex.len() {
            3 => Ok(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
            6 => Ok(Self::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Self {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a: byte(6)?,
            }),
            _ => Err(TrainreelError::validation(format!(
                "color '{s}' must have 3, 6 or 8 hex digits"
            ))),
        }
    }
}

impl std::str::FromStr for Rgba8 {
    type Err = TrainreelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl TryFrom<String> for Rgba8 {
    type Error = TrainreelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse_hex(&s)
    }
}

impl From<Rgba8> for String {
    fn from(c: Rgba8) -> Self {
        if c.a == 255 {
            format!("#{:02x}{:02x}{:02x}", c.r, c.g, c.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", c.r, c.g, c.b, c.a)
        }
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Premultiplied RGBA8 byte array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
