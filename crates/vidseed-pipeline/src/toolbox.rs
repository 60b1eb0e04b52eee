//! External tool seam.
//!
//! The orchestrator talks to the media tools through this trait so tests can
//! substitute a deterministic fake and never depend on the binaries being
//! installed.

use std::path::Path;

use async_trait::async_trait;

use vidseed_media::{MediaResult, RenditionProbe};

/// The external tools the pipeline depends on.
#[async_trait]
pub trait MediaToolbox: Send + Sync {
    /// Native height of the source video stream.
    async fn probe_height(&self, path: &Path) -> MediaResult<u32>;

    /// Duration and byte size of a produced rendition.
    async fn probe_rendition(&self, path: &Path) -> MediaResult<RenditionProbe>;

    /// Transcode `src` to `dst` at `height`.
    async fn encode(
        &self,
        src: &Path,
        crf: u8,
        height: u32,
        preset: &str,
        dst: &Path,
    ) -> MediaResult<()>;

    /// Create a `.torrent` for `media`.
    async fn make_torrent(
        &self,
        media: &Path,
        torrent: &Path,
        trackers: &[String],
        chunk_factor: u32,
    ) -> MediaResult<()>;

    /// Extract the first decodable frame as a poster.
    async fn extract_poster(&self, video: &Path, dst: &Path) -> MediaResult<()>;

    /// Pixel dimensions of an uploaded image.
    fn image_dimensions(&self, path: &Path) -> MediaResult<(u32, u32)>;
}

/// Production toolbox backed by ffmpeg, ffprobe and mktorrent.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegToolbox;

#[async_trait]
impl MediaToolbox for FfmpegToolbox {
    async fn probe_height(&self, path: &Path) -> MediaResult<u32> {
        vidseed_media::probe_height(path).await
    }

    async fn probe_rendition(&self, path: &Path) -> MediaResult<RenditionProbe> {
        vidseed_media::probe_rendition(path).await
    }

    async fn encode(
        &self,
        src: &Path,
        crf: u8,
        height: u32,
        preset: &str,
        dst: &Path,
    ) -> MediaResult<()> {
        vidseed_media::encode(src, crf, height, preset, dst).await
    }

    async fn make_torrent(
        &self,
        media: &Path,
        torrent: &Path,
        trackers: &[String],
        chunk_factor: u32,
    ) -> MediaResult<()> {
        vidseed_media::make_torrent(media, torrent, trackers, chunk_factor).await
    }

    async fn extract_poster(&self, video: &Path, dst: &Path) -> MediaResult<()> {
        vidseed_media::extract_first_frame(video, dst).await
    }

    fn image_dimensions(&self, path: &Path) -> MediaResult<(u32, u32)> {
        vidseed_media::image_dimensions(path)
    }
}
