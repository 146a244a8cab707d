use std::time::Duration;

/// Convenience result type used across trainreel.
pub type TrainreelResult<T> = Result<T, TrainreelError>;

/// Top-level error taxonomy used by pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum TrainreelError {
    /// Invalid user-provided options or script data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while laying out or rasterizing a frame.
    #[error("render error: {0}")]
    Render(String),

    /// The platform cannot provide a capture stream or a compatible encoder.
    #[error("encoding unavailable: {0}")]
    EncodingUnavailable(String),

    /// The encoder started but failed while consuming or finalizing frames.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The speech engine reported an error for an utterance.
    #[error("speech error: {0}")]
    Speech(String),

    /// An external primitive did not finish in time.
    #[error("timed out after {after:?}: {what}")]
    Timeout {
        /// What was being waited on.
        what: String,
        /// How long we waited.
        after: Duration,
    },

    /// The frame sink was closed before the producer finished.
    #[error("sink closed: {0}")]
    SinkClosed(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrainreelError {
    /// Build a [`TrainreelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TrainreelError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`TrainreelError::EncodingUnavailable`] value.
    pub fn encoding_unavailable(msg: impl Into<String>) -> Self {
        Self::EncodingUnavailable(msg.into())
    }

    /// Build a [`TrainreelError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`TrainreelError::Speech`] value.
    pub fn speech(msg: impl Into<String>) -> Self {
        Self::Speech(msg.into())
    }

    /// Build a [`TrainreelError::Timeout`] value.
    pub fn timeout(what: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            what: what.into(),
            after,
        }
    }

    /// Build a [`TrainreelError::SinkClosed`] value.
    pub fn sink_closed(msg: impl Into<String>) -> Self {
        Self::SinkClosed(msg.into())
    }

    /// Build a [`TrainreelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
