//! Deterministic animation state for one scene frame.
//!
//! Everything here is a pure function of the progress fraction (and the bullet/line counts).
//! The CPU renderer turns a [`FrameState`] into pixels; tests can inspect it directly.

use crate::animation::ease::Ease;
use crate::foundation::math::{lerp, window};

/// Title animation finishes at this progress.
pub const TITLE_END: f64 = 0.2;
/// Content panel starts fading in.
pub const PANEL_START: f64 = 0.2;
/// Last panel line has started revealing by this progress.
pub const PANEL_END: f64 = 0.8;
/// First bullet starts appearing.
pub const BULLETS_START: f64 = 0.3;
/// Bullets are staggered across this span.
pub const BULLETS_SPAN: f64 = 0.7;
/// Whole-frame fade-out starts.
pub const FADE_OUT_START: f64 = 0.9;

const PANEL_FADE: f64 = 0.1;
const LINE_FADE: f64 = 0.1;
const BULLET_FADE_MAX: f64 = 0.1;

/// Title start offset below its resting baseline, in 1080p reference pixels.
pub const TITLE_RISE_PX: f64 = 60.0;
/// Panel start offset below its resting position, in reference pixels.
pub const PANEL_RISE_PX: f64 = 40.0;
/// Bullet start offset to the left of its resting position, in reference pixels.
pub const BULLET_SLIDE_PX: f64 = 80.0;

/// Title transform and opacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TitleState {
    /// Uniform scale around the title anchor (0.5 -> 1.0).
    pub scale: f64,
    /// Vertical offset in reference pixels (positive is lower).
    pub offset_y: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

/// Content panel body state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelState {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Vertical offset in reference pixels.
    pub offset_y: f64,
}

/// One bullet's state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BulletState {
    /// Opacity in `[0, 1]`; zero means not yet shown.
    pub opacity: f64,
    /// Horizontal offset in reference pixels (negative is further left).
    pub offset_x: f64,
}

/// Complete animation state of a frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameState {
    /// Sanitized progress in `[0, 1]`.
    pub progress: f64,
    /// Title state.
    pub title: TitleState,
    /// Panel body state.
    pub panel: PanelState,
    /// Bullet states in list order.
    pub bullets: Vec<BulletState>,
    /// Multiplier applied to the whole frame (fade to black at the end).
    pub frame_opacity: f64,
}

impl FrameState {
    /// Evaluate the timeline at `progress` for a scene with `bullet_count` bullets.
    ///
    /// Progress outside `[0, 1]` is clamped; NaN is treated as `0`.
    pub fn at(progress: f64, bullet_count: usize) -> Self {
        let p = sanitize_progress(progress);
        Self {
            progress: p,
            title: title_state(p),
            panel: panel_state(p),
            bullets: (0..bullet_count)
                .map(|i| bullet_state(p, i, bullet_count))
                .collect(),
            frame_opacity: frame_opacity(p),
        }
    }

    /// Number of bullets currently drawn (opacity > 0).
    pub fn visible_bullets(&self) -> usize {
        self.bullets.iter().filter(|b| b.opacity > 0.0).count()
    }

    /// Opacity of wrapped panel line `line` out of `line_count`.
    pub fn panel_line_opacity(&self, line: usize, line_count: usize) -> f64 {
        panel_line_opacity(self.progress, line, line_count)
    }
}

/// Clamp progress into `[0, 1]`, mapping NaN to `0`.
pub fn sanitize_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, 1.0)
}

/// Title enters over `[0, TITLE_END)` with an elastic ease and is settled afterwards.
pub fn title_state(p: f64) -> TitleState {
    let t = window(p, 0.0, TITLE_END);
    if t >= 1.0 {
        return TitleState {
            scale: 1.0,
            offset_y: 0.0,
            opacity: 1.0,
        };
    }
    let e = Ease::OutElastic.apply(t);
    TitleState {
        scale: lerp(0.5, 1.0, e),
        offset_y: (1.0 - e) * TITLE_RISE_PX,
        opacity: Ease::OutQuad.apply(t),
    }
}

fn panel_state(p: f64) -> PanelState {
    let e = Ease::OutCubic.apply(window(p, PANEL_START, PANEL_FADE));
    PanelState {
        opacity: e,
        offset_y: (1.0 - e) * PANEL_RISE_PX,
    }
}

fn panel_line_opacity(p: f64, line: usize, line_count: usize) -> f64 {
    if line_count == 0 || line >= line_count {
        return 0.0;
    }
    let start = PANEL_START + (line as f64 / line_count as f64) * (PANEL_END - PANEL_START);
    window(p, start, LINE_FADE)
}

/// Progress at which bullet `index` out of `count` begins to appear.
pub fn bullet_start(index: usize, count: usize) -> f64 {
    if count == 0 {
        return 1.0;
    }
    BULLETS_START + (index as f64 / count as f64) * BULLETS_SPAN
}

fn bullet_state(p: f64, index: usize, count: usize) -> BulletState {
    let ramp = (BULLETS_SPAN / count.max(1) as f64).min(BULLET_FADE_MAX);
    let start = bullet_start(index, count);
    let t = window(p, start, ramp);
    BulletState {
        opacity: t,
        offset_x: -(1.0 - Ease::OutBack.apply(t)) * BULLET_SLIDE_PX,
    }
}

fn frame_opacity(p: f64) -> f64 {
    if p < FADE_OUT_START {
        return 1.0;
    }
    1.0 - window(p, FADE_OUT_START, 1.0 - FADE_OUT_START)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
