use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::scene::model::Scene;
use crate::scene::options::RenderOptions;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// JSON-facing video script: optional render options plus the ordered scene list.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VideoScript {
    /// Render options; missing fields fall back to [`RenderOptions::default`].
    #[serde(default)]
    pub options: RenderOptions,
    /// Scenes in playback order.
    pub scenes: Vec<Scene>,
}

impl VideoScript {
    /// Parse a script from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TrainreelResult<Self> {
        let script: Self = serde_json::from_reader(r)
            .map_err(|e| TrainreelError::serde(format!("parse video script JSON: {e}")))?;
        Ok(script)
    }

    /// Parse a script from a JSON string.
    pub fn from_json_str(s: &str) -> TrainreelResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse a script from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TrainreelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TrainreelError::validation(format!("open video script '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate options. Scenes themselves are not validated.
    pub fn validate(&self) -> TrainreelResult<()> {
        self.options.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/script.rs"]
mod tests;
