use crate::foundation::error::TrainreelResult;

/// One installed synthesis voice.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Voice {
    /// Display name, unique within a catalog.
    pub name: String,
    /// BCP-47 style language tag (`en-US`, `de`).
    pub lang: String,
    /// The engine's default voice.
    #[serde(default)]
    pub default: bool,
}

impl Voice {
    /// Create a non-default voice.
    pub fn new(name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            default: false,
        }
    }

    /// Mark this voice as the engine default.
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// Source of installed voices.
///
/// Listing may legitimately come back empty while an engine is still loading; callers re-query
/// per utterance instead of caching an empty answer.
pub trait VoiceCatalog: Send + Sync {
    /// Currently installed voices.
    fn voices(&self) -> TrainreelResult<Vec<Voice>>;
}

/// Fixed voice list.
#[derive(Clone, Debug, Default)]
pub struct StaticVoiceCatalog {
    voices: Vec<Voice>,
}

impl StaticVoiceCatalog {
    /// Serve exactly `voices`.
    pub fn new(voices: Vec<Voice>) -> Self {
        Self { voices }
    }
}

impl VoiceCatalog for StaticVoiceCatalog {
    fn voices(&self) -> TrainreelResult<Vec<Voice>> {
        Ok(self.voices.clone())
    }
}

/// How a voice was picked by [`select_voice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceMatch {
    /// The requested name is installed.
    Name,
    /// Same full language tag.
    Language,
    /// Same primary language subtag.
    PrimaryLanguage,
    /// Nothing matched; the engine picks its default.
    EngineDefault,
}

/// Pick a voice: explicit `name` if installed, else the first voice with the exact language
/// tag, else the first with the same primary subtag, else none (engine default).
pub fn select_voice<'a>(
    voices: &'a [Voice],
    name: Option<&str>,
    language: &str,
) -> (Option<&'a Voice>, VoiceMatch) {
    if let Some(name) = name
        && let Some(v) = voices.iter().find(|v| v.name == name)
    {
        return (Some(v), VoiceMatch::Name);
    }

    let wanted = normalize_tag(language);
    if wanted.is_empty() {
        return (None, VoiceMatch::EngineDefault);
    }
    if let Some(v) = voices.iter().find(|v| normalize_tag(&v.lang) == wanted) {
        return (Some(v), VoiceMatch::Language);
    }

    let primary = primary_subtag(&wanted);
    if let Some(v) = voices
        .iter()
        .find(|v| primary_subtag(&normalize_tag(&v.lang)) == primary)
    {
        return (Some(v), VoiceMatch::PrimaryLanguage);
    }

    (None, VoiceMatch::EngineDefault)
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().replace('_', "-").to_ascii_lowercase()
}

fn primary_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

#[cfg(test)]
#[path = "../../tests/unit/narration/voice.rs"]
mod tests;
