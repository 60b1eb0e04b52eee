//! Pipeline error taxonomy.
//!
//! Adapter failures are folded into a small set of caller-facing kinds so the
//! HTTP layer can map them to statuses without inspecting subprocess output.

use thiserror::Error;
use vidseed_media::MediaError;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Errors reported by the ingestion pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported media type: {0}")]
    UnsupportedMedia(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("required tool unavailable: {0}")]
    ToolingUnavailable(String),

    #[error("no usable rendition was produced")]
    NoRenditions,

    #[error("encoder pool is at capacity, try again later")]
    PoolFull,

    #[error("registry error: {0}")]
    Registry(String),

    #[error("media error: {0}")]
    Media(MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn unsupported_media(msg: impl Into<String>) -> Self {
        Self::UnsupportedMedia(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn registry(msg: impl Into<String>) -> Self {
        Self::Registry(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Classify an adapter error, folding missing binaries into the
    /// deployment-diagnosable kind.
    pub fn from_media(e: MediaError) -> Self {
        if e.is_tool_missing() {
            Self::ToolingUnavailable(e.to_string())
        } else {
            Self::Media(e)
        }
    }

    /// True when the error indicates a deployment problem rather than a bad
    /// upload.
    pub fn is_tooling_unavailable(&self) -> bool {
        matches!(self, Self::ToolingUnavailable(_))
    }
}
