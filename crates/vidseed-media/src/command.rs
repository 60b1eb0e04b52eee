//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

use vidseed_models::encoding::MONO_DOWNMIX_MAX_HEIGHT;

/// How many trailing stderr lines are kept for error reporting.
const STDERR_TAIL_LINES: usize = 40;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Add an input argument (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an output argument (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Set video filter.
    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    /// Set video codec.
    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    /// Set CRF (quality).
    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    /// Set encoder preset.
    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    /// Downmix audio to mono.
    pub fn mono_audio(self) -> Self {
        self.output_arg("-ac").output_arg("1")
    }

    /// Scale to the given height, preserving aspect ratio and forcing an even
    /// width (libx264 rejects odd frame dimensions).
    pub fn scale_to_height(self, height: u32) -> Self {
        self.video_filter(format!("scale=trunc(oh*a/2)*2:{height}"))
    }

    /// Downmix to mono for small renditions where stereo wastes bandwidth.
    pub fn mono_audio_below(self, height: u32) -> Self {
        if height <= MONO_DOWNMIX_MAX_HEIGHT {
            self.mono_audio()
        } else {
            self
        }
    }

    /// Move the moov atom up front so playback can start before the download
    /// completes.
    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("+faststart")
    }

    /// Extract a single frame.
    pub fn single_frame(self) -> Self {
        self.output_arg("-vframes").output_arg("1")
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        args.extend(self.input_args.clone());

        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        args.extend(self.output_args.clone());

        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Runner for FFmpeg commands with an optional timeout.
#[derive(Debug, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run an FFmpeg command to completion.
    pub async fn run(&self, cmd: &FfmpegCommand) -> MediaResult<()> {
        which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let args = cmd.build_args();
        debug!("Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()?;

        let stderr = child.stderr.take().expect("stderr not captured");
        let mut reader = BufReader::new(stderr).lines();

        // Drain stderr concurrently, keeping only the tail for diagnostics.
        let stderr_handle = tokio::spawn(async move {
            let mut tail: Vec<String> = Vec::new();
            while let Ok(Some(line)) = reader.next_line().await {
                if tail.len() >= STDERR_TAIL_LINES {
                    tail.remove(0);
                }
                tail.push(line);
            }
            tail.join("\n")
        });

        let status = self.wait_for_completion(&mut child).await?;
        let stderr_tail = stderr_handle.await.unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(MediaError::ffmpeg_failed(
                "ffmpeg exited with non-zero status",
                Some(stderr_tail).filter(|s| !s.is_empty()),
                status.code(),
            ))
        }
    }

    async fn wait_for_completion(&self, child: &mut Child) -> MediaResult<std::process::ExitStatus> {
        if let Some(timeout_secs) = self.timeout_secs {
            let timeout = std::time::Duration::from_secs(timeout_secs);
            match tokio::time::timeout(timeout, child.wait()).await {
                Ok(result) => Ok(result?),
                Err(_) => {
                    warn!("ffmpeg timed out after {timeout_secs} seconds, killing process");
                    let _ = child.kill().await;
                    Err(MediaError::Timeout(timeout_secs))
                }
            }
        } else {
            Ok(child.wait().await?)
        }
    }
}

/// Check if ffmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if ffprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

/// Check if mktorrent is available.
pub fn check_mktorrent() -> MediaResult<PathBuf> {
    which::which("mktorrent").map_err(|_| MediaError::MktorrentNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("input.mp4", "output.mp4")
            .scale_to_height(720)
            .faststart()
            .video_codec("libx264")
            .crf(28);

        let args = cmd.build_args();
        assert!(args.contains(&"-vf".to_string()));
        assert!(args.contains(&"scale=trunc(oh*a/2)*2:720".to_string()));
        assert!(args.contains(&"-movflags".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
        assert!(args.contains(&"-crf".to_string()));
        assert!(args.contains(&"28".to_string()));
        assert_eq!(args.last().unwrap(), "output.mp4");
    }

    #[test]
    fn test_mono_downmix_threshold() {
        let small = FfmpegCommand::new("in.mp4", "out.mp4").mono_audio_below(480);
        assert!(small.build_args().contains(&"-ac".to_string()));

        let large = FfmpegCommand::new("in.mp4", "out.mp4").mono_audio_below(720);
        assert!(!large.build_args().contains(&"-ac".to_string()));
    }

    #[test]
    fn test_overwrite_flag_leads() {
        let args = FfmpegCommand::new("in.mp4", "out.mp4").build_args();
        assert_eq!(args[0], "-y");
    }
}
