use crate::foundation::core::Fps;

/// One timed segment of a synthetic training video.
///
/// Scenes are immutable inputs supplied wholesale by the caller. Degenerate values (zero
/// duration, empty narration) are accepted; they simply produce zero frames or an
/// immediately-completed utterance.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    /// Headline drawn at the top of every frame.
    pub title: String,
    /// Text spoken by the narrator; never drawn.
    #[serde(default)]
    pub narration: String,
    /// Description shown in the content panel.
    #[serde(default)]
    pub visual: String,
    /// Scene length in whole seconds.
    pub duration: u32,
    /// Bullet list revealed one item at a time.
    #[serde(default, alias = "onScreenText")]
    pub on_screen_text: Vec<String>,
}

impl Scene {
    /// Create a scene with a title and duration; other fields start empty.
    pub fn new(title: impl Into<String>, duration: u32) -> Self {
        Self {
            title: title.into(),
            duration,
            ..Self::default()
        }
    }

    /// Set the narration text.
    pub fn with_narration(mut self, narration: impl Into<String>) -> Self {
        self.narration = narration.into();
        self
    }

    /// Set the content-panel text.
    pub fn with_visual(mut self, visual: impl Into<String>) -> Self {
        self.visual = visual.into();
        self
    }

    /// Set the bullet list.
    pub fn with_bullets<I, S>(mut self, bullets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.on_screen_text = bullets.into_iter().map(Into::into).collect();
        self
    }

    /// Number of frames rendered for this scene at `fps` (`floor(duration * fps)`).
    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.frames_for_secs(self.duration)
    }
}

/// Total frame count of an ordered scene list.
pub fn total_frames(scenes: &[Scene], fps: Fps) -> u64 {
    scenes.iter().map(|s| s.frame_count(fps)).sum()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
