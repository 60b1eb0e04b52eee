//! FFprobe adapters.
//!
//! The probe contract is the tool's stable `key=value` section output:
//! `-show_streams` yields a `height=<int>` line, `-show_format` a
//! `duration=<float>` line.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{MediaError, MediaResult};

/// Size and duration of a produced rendition file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenditionProbe {
    /// Duration in seconds
    pub duration: f64,
    /// File size in bytes
    pub size: u64,
}

/// Probe the native height of a video stream.
pub async fn probe_height(path: impl AsRef<Path>) -> MediaResult<u32> {
    let text = run_ffprobe(path.as_ref(), "-show_streams").await?;
    parse_field(&text, "height")
        .and_then(|v| v.parse::<u32>().ok())
        .filter(|h| *h > 0)
        .ok_or_else(|| MediaError::probe_failed("no video stream height reported", None))
}

/// Probe the container duration in seconds.
pub async fn probe_duration(path: impl AsRef<Path>) -> MediaResult<f64> {
    let text = run_ffprobe(path.as_ref(), "-show_format").await?;
    parse_field(&text, "duration")
        .and_then(|v| v.parse::<f64>().ok())
        .ok_or_else(|| MediaError::probe_failed("no format duration reported", None))
}

/// Probe duration and byte size of a produced rendition.
pub async fn probe_rendition(path: impl AsRef<Path>) -> MediaResult<RenditionProbe> {
    let path = path.as_ref();
    let duration = probe_duration(path).await?;
    let size = tokio::fs::metadata(path).await?.len();
    Ok(RenditionProbe { duration, size })
}

async fn run_ffprobe(path: &Path, section: &str) -> MediaResult<String> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new("ffprobe")
        .arg("-v")
        .arg("error")
        .arg(path)
        .arg(section)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::probe_failed(
            format!("ffprobe exited with status {}", output.status),
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Find the first `key=value` line for `key` in ffprobe section output.
fn parse_field<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    text.lines().find_map(|line| {
        let line = line.trim();
        let value = line.strip_prefix(key)?.strip_prefix('=')?;
        (value != "N/A").then_some(value)
    })
}
