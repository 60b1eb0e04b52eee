//! Error types for media tool adapters.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while driving the external media tools.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("ffmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("ffprobe not found in PATH")]
    FfprobeNotFound,

    #[error("mktorrent not found in PATH")]
    MktorrentNotFound,

    #[error("ffmpeg failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("ffprobe failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("mktorrent failed: {message}")]
    TorrentFailed {
        message: String,
        exit_code: Option<i32>,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid video file: {0}")]
    InvalidVideo(String),

    #[error("invalid image file: {0}")]
    InvalidImage(String),

    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an ffmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Create a torrent failure error.
    pub fn torrent_failed(message: impl Into<String>, exit_code: Option<i32>) -> Self {
        Self::TorrentFailed {
            message: message.into(),
            exit_code,
        }
    }

    /// True for errors caused by a binary missing from PATH.
    ///
    /// These indicate a deployment problem, not a bad upload, and are
    /// reported to callers under a distinct error kind.
    pub fn is_tool_missing(&self) -> bool {
        matches!(
            self,
            Self::FfmpegNotFound | Self::FfprobeNotFound | Self::MktorrentNotFound
        )
    }
}
