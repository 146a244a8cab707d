use crate::foundation::error::TrainreelResult;
use std::path::Path;

/// MIME type of videos produced by the WebM sink.
pub const WEBM_MIME: &str = "video/webm";

/// One finished, fully-flushed video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoBlob {
    /// Container MIME type.
    pub mime_type: String,
    /// Encoded container bytes.
    pub bytes: Vec<u8>,
}

impl VideoBlob {
    /// Wrap WebM bytes.
    pub fn webm(bytes: Vec<u8>) -> Self {
        Self {
            mime_type: WEBM_MIME.to_owned(),
            bytes,
        }
    }

    /// Size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when no bytes were produced.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `true` for `video/*` MIME types.
    pub fn is_video(&self) -> bool {
        self.mime_type.starts_with("video/")
    }

    /// Write the blob to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> TrainreelResult<()> {
        use anyhow::Context as _;
        crate::encode::webm::ensure_parent_dir(path)?;
        std::fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write video '{}'", path.display()))?;
        Ok(())
    }
}
