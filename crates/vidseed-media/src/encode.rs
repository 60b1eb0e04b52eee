//! Rendition encoding.

use std::path::Path;
use tracing::info;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Encode `src` into an H.264 MP4 at `height`, preserving aspect ratio.
///
/// Small renditions get a mono downmix; every output carries the faststart
/// flag so playback can begin before the full download.
pub async fn encode(
    src: impl AsRef<Path>,
    crf: u8,
    height: u32,
    preset: &str,
    dst: impl AsRef<Path>,
) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }

    info!(src = %src.display(), dst = %dst.display(), height, crf, "encoding rendition");

    let cmd = FfmpegCommand::new(src, dst)
        .scale_to_height(height)
        .mono_audio_below(height)
        .faststart()
        .preset(preset)
        .video_codec("libx264")
        .crf(crf);

    FfmpegRunner::new().run(&cmd).await?;

    info!(dst = %dst.display(), height, "rendition encoded");
    Ok(())
}
