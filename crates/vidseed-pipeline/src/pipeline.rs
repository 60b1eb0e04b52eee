//! The ingestion orchestrator.
//!
//! Runs one upload through `Validating -> Downloading -> Planning ->
//! Encoding -> Packaging -> Manifesting`. The per-video directory is the unit
//! of isolation: it is created exclusively (concurrent duplicate uploads lose
//! with a conflict), and a cleanup guard removes it on any failure or unwind
//! until the manifest is durable.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scopeguard::ScopeGuard;
use tracing::{error, info, warn};

use vidseed_media::{move_file, PLACEHOLDER_POSTER};
use vidseed_models::{sanitize_title, NewVideo, Rendition, VideoManifest, WebtorrentInfo};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::manifest::{sync_player_shell, write_manifest};
use crate::planner::plan_renditions;
use crate::pool::EncoderPool;
use crate::registry::VideoRegistry;
use crate::retry::{retry_async, RetryConfig};
use crate::subtitles::collect_subtitles;
use crate::toolbox::MediaToolbox;

/// Extensions accepted when transcoding is requested.
const TRANSCODE_EXTENSIONS: &[&str] = &[".mp4", ".mkv", ".webm"];
/// Extensions accepted when the upload is only repackaged.
const PASSTHROUGH_EXTENSIONS: &[&str] = &[".mp4"];

/// A file staged in scratch space, keeping its declared name.
#[derive(Debug, Clone)]
pub struct StagedFile {
    /// Declared file name (used for extension and subtitle language checks)
    pub name: String,
    /// Where the payload was streamed to
    pub path: PathBuf,
}

impl StagedFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Lowercased extension with leading dot, or empty when there is none.
    pub fn extension(&self) -> String {
        Path::new(&self.name)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default()
    }
}

/// One ingestion request.
#[derive(Debug)]
pub struct IngestRequest {
    /// Declared title; must be unique across the registry
    pub title: String,
    /// Free-form description recorded on the video entity
    pub description: String,
    /// The uploaded source video, already streamed to scratch
    pub source: StagedFile,
    /// Optional explicit poster image (`.jpg`)
    pub thumbnail: Option<StagedFile>,
    /// Optional subtitle tracks (`.vtt`)
    pub subtitles: Vec<StagedFile>,
    /// Whether to produce the configured rendition ladder
    pub transcode: bool,
}

/// Result of a successful ingestion.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    /// Canonical playback URL
    pub playback_url: String,
    /// Poster image URL
    pub poster_url: String,
    /// Path of the written `video.json`
    pub manifest_path: PathBuf,
    /// Number of renditions that made it into the manifest
    pub renditions: usize,
    /// Registry id of the created video entity
    pub video_id: i64,
}

/// The ingestion pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    pool: Arc<EncoderPool>,
    registry: Arc<dyn VideoRegistry>,
    toolbox: Arc<dyn MediaToolbox>,
}

impl Pipeline {
    /// Build a pipeline; the encoder pool is sized from the config and shared
    /// across all requests served by this instance.
    pub fn new(
        config: PipelineConfig,
        registry: Arc<dyn VideoRegistry>,
        toolbox: Arc<dyn MediaToolbox>,
    ) -> Self {
        let pool = Arc::new(EncoderPool::new(
            config.encode_workers,
            config.max_queued_tasks,
        ));
        Self::with_pool(config, pool, registry, toolbox)
    }

    /// Build a pipeline around an existing pool, e.g. one shared with other
    /// components or sized to 1 for deterministic tests.
    pub fn with_pool(
        config: PipelineConfig,
        pool: Arc<EncoderPool>,
        registry: Arc<dyn VideoRegistry>,
        toolbox: Arc<dyn MediaToolbox>,
    ) -> Self {
        Self {
            config,
            pool,
            registry,
            toolbox,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> Arc<dyn VideoRegistry> {
        Arc::clone(&self.registry)
    }

    /// Ingest one source video into a complete artifact set.
    ///
    /// On success the video directory holds `<height>.mp4` (+ `.torrent`)
    /// per rendition, `thumbnail.jpg`, `video.json` and the player shell, and
    /// the registry holds the video entity. On failure nothing survives:
    /// the directory is rolled back and no entity is registered.
    pub async fn ingest(&self, request: IngestRequest) -> PipelineResult<IngestOutcome> {
        self.validate(&request).await?;

        let title = request.title.trim();
        let slug = sanitize_title(title);
        let video_dir = self.config.video_dir(&slug);

        tokio::fs::create_dir_all(&self.config.video_root).await?;

        // Exclusive creation arbitrates concurrent uploads of the same title;
        // the loser must not touch the winner's directory.
        match tokio::fs::create_dir(&video_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(PipelineError::conflict(format!(
                    "video {title} already exists"
                )));
            }
            Err(e) => return Err(PipelineError::Io(e)),
        }

        info!(title, dir = %video_dir.display(), "video directory created");

        // Armed from here until the manifest is durable; runs synchronously on
        // every failure path, including cancellation mid-pipeline.
        let guard = scopeguard::guard(video_dir.clone(), |dir| {
            warn!(dir = %dir.display(), "rolling back partial video directory");
            if let Err(e) = std::fs::remove_dir_all(&dir) {
                error!(dir = %dir.display(), error = %e, "rollback failed, manual cleanup required");
            }
        });

        let outcome = self.run_to_manifest(&request, &slug, &video_dir).await?;

        // Manifesting completed; the directory is now the durable artifact.
        ScopeGuard::into_inner(guard);

        info!(title, url = %outcome.playback_url, renditions = outcome.renditions, "ingest complete");
        Ok(outcome)
    }

    /// Delete a video: registry record plus its directory. Directory removal
    /// is retried with backoff; file handles can lag on some platforms.
    pub async fn delete_video(&self, title: &str) -> PipelineResult<()> {
        let title = title.trim();
        let slug = sanitize_title(title);
        let video_dir = self.config.video_dir(&slug);

        self.registry.delete(title).await?;

        let retry = RetryConfig::new("remove video directory");
        let dir = video_dir.clone();
        let removed = retry_async(&retry, || {
            let dir = dir.clone();
            async move {
                match tokio::fs::remove_dir_all(&dir).await {
                    Ok(()) => Ok(()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                    Err(e) => Err(e),
                }
            }
        })
        .await;

        if let Err(e) = removed {
            error!(
                dir = %video_dir.display(),
                error = %e,
                "video directory could not be removed, manual cleanup required"
            );
            return Err(PipelineError::internal(format!(
                "failed to remove {}: {e}",
                video_dir.display()
            )));
        }

        info!(title, "video deleted");
        Ok(())
    }

    /// Validating: everything here runs before any filesystem mutation.
    async fn validate(&self, request: &IngestRequest) -> PipelineResult<()> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(PipelineError::validation("title must not be empty"));
        }

        let ext = request.source.extension();
        let allowed: &[&str] = if request.transcode {
            TRANSCODE_EXTENSIONS
        } else {
            PASSTHROUGH_EXTENSIONS
        };
        if !allowed.contains(&ext.as_str()) {
            return Err(PipelineError::unsupported_media(format!(
                "invalid file type {}, must be one of {}",
                if ext.is_empty() { "(none)" } else { &ext },
                allowed.join(", ")
            )));
        }

        if let Some(thumbnail) = &request.thumbnail {
            if thumbnail.extension() != ".jpg" {
                return Err(PipelineError::unsupported_media(
                    "thumbnail must be a .jpg",
                ));
            }
            let (w, h) = self
                .toolbox
                .image_dimensions(&thumbnail.path)
                .map_err(PipelineError::from_media)?;
            let max = self.config.max_thumbnail_dimension;
            if w > max || h > max {
                return Err(PipelineError::validation(format!(
                    "thumbnail is {w}x{h}, exceeds the {max}px bound"
                )));
            }
        }

        for subtitle in &request.subtitles {
            if !subtitle.name.ends_with(".vtt")
                || subtitle.name.contains('/')
                || subtitle.name.contains('\\')
            {
                return Err(PipelineError::validation(format!(
                    "invalid subtitle file name {}",
                    subtitle.name
                )));
            }
        }

        if !self.config.data_root.exists() {
            return Err(PipelineError::internal(format!(
                "uploads disabled: data root {} does not exist",
                self.config.data_root.display()
            )));
        }

        if self.registry.exists(title).await? {
            return Err(PipelineError::conflict(format!(
                "video {title} already exists"
            )));
        }

        Ok(())
    }

    async fn run_to_manifest(
        &self,
        request: &IngestRequest,
        slug: &str,
        video_dir: &Path,
    ) -> PipelineResult<IngestOutcome> {
        // Downloading: the probe runs against the scratch copy; nothing moves
        // under the public root until the source is known to be a video.
        let native = self
            .toolbox
            .probe_height(&request.source.path)
            .await
            .map_err(PipelineError::from_media)?;

        // An mp4 source doubles as its own native rendition. Other containers
        // stay in scratch and the native height is encoded like any other.
        let source_is_mp4 = request.source.extension() == ".mp4";
        let source_path = if source_is_mp4 {
            let dst = video_dir.join(format!("{native}.mp4"));
            move_file(&request.source.path, &dst)
                .await
                .map_err(PipelineError::from_media)?;
            dst
        } else {
            request.source.path.clone()
        };

        self.stage_subtitles(request, video_dir).await?;

        // Planning.
        let plan = plan_renditions(native, &self.config.encoding.heights, request.transcode);
        info!(title = %request.title.trim(), native, ?plan, "renditions planned");

        // Encoding + Packaging fan-out on the shared bounded pool.
        let url_slug = self.config.url_slug(slug);
        let base_url = self.config.base_url();
        let mut handles = Vec::with_capacity(plan.len());
        for height in &plan {
            let job = RenditionJob {
                toolbox: Arc::clone(&self.toolbox),
                video_dir: video_dir.to_path_buf(),
                source: source_path.clone(),
                height: *height,
                reuse_source: source_is_mp4 && *height == native,
                crf: self.config.encoding.crf,
                preset: self.config.encoding.preset.clone(),
                base_url: base_url.clone(),
                url_slug: url_slug.clone(),
                trackers: self.config.trackers.clone(),
                chunk_factor: self.config.chunk_factor,
                webtorrent: self.config.webtorrent_enabled,
            };
            let handle = self
                .pool
                .submit(produce_rendition(job))
                .map_err(|_| PipelineError::PoolFull)?;
            handles.push((*height, handle));
        }

        // Gather every submitted task before manifesting. Sibling failures are
        // contained; a missing binary is escalated as a deployment problem.
        let mut renditions = Vec::new();
        let mut tooling_error: Option<PipelineError> = None;
        for (height, handle) in handles {
            match handle.join().await {
                Some(Ok(rendition)) => renditions.push(rendition),
                Some(Err(e)) if e.is_tooling_unavailable() => {
                    error!(height, error = %e, "rendition task hit a deployment problem");
                    tooling_error.get_or_insert(e);
                }
                Some(Err(e)) => {
                    warn!(height, error = %e, "rendition task failed, omitting from manifest");
                }
                None => warn!(height, "rendition task vanished before completing"),
            }
        }
        if let Some(e) = tooling_error {
            return Err(e);
        }
        if renditions.len() < self.config.min_renditions.max(1) {
            return Err(PipelineError::NoRenditions);
        }
        renditions.sort_by(|a, b| b.height.cmp(&a.height));

        // Packaging: subtitles were staged before the fan-out; resolve poster.
        let subtitles = collect_subtitles(video_dir, &url_slug)?;
        let poster_url = self
            .place_poster(request, video_dir, &source_path, &url_slug)
            .await?;

        let playback_url = self.config.playback_url(slug);
        let primary = &renditions[0];
        let primary_path = video_dir.join(format!("{}.mp4", primary.height));

        let entity = self
            .registry
            .create(NewVideo {
                title: request.title.trim().to_string(),
                url: playback_url.clone(),
                description: request.description.clone(),
                path: primary_path.to_string_lossy().to_string(),
                duration: primary.duration,
            })
            .await?;

        // Manifesting. If it fails after the entity was created, compensate so
        // a failed ingestion never leaves a registered video behind.
        let manifesting = self
            .write_artifacts(video_dir, &entity.title, entity.id, renditions, subtitles, &url_slug, &playback_url, &poster_url)
            .await;
        match manifesting {
            Ok((manifest_path, rendition_count)) => Ok(IngestOutcome {
                playback_url,
                poster_url,
                manifest_path,
                renditions: rendition_count,
                video_id: entity.id,
            }),
            Err(e) => {
                if let Err(de) = self.registry.delete(&entity.title).await {
                    error!(title = %entity.title, error = %de, "failed to unregister after manifest failure");
                }
                Err(e)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn write_artifacts(
        &self,
        video_dir: &Path,
        title: &str,
        id: i64,
        renditions: Vec<Rendition>,
        subtitles: Vec<vidseed_models::Subtitle>,
        url_slug: &str,
        playback_url: &str,
        poster_url: &str,
    ) -> PipelineResult<(PathBuf, usize)> {
        let manifest = VideoManifest {
            title: title.to_string(),
            id,
            urlslug: url_slug.to_string(),
            url: playback_url.to_string(),
            domain: self.config.domain.clone(),
            videos: renditions,
            subtitles,
            poster: poster_url.to_string(),
            webtorrent: WebtorrentInfo {
                enabled: self.config.webtorrent_enabled,
                eager_webseed: self.config.eager_webseed,
            },
        };

        let manifest_path = write_manifest(video_dir, &manifest).await?;
        sync_player_shell(video_dir)?;
        Ok((manifest_path, manifest.videos.len()))
    }

    async fn stage_subtitles(
        &self,
        request: &IngestRequest,
        video_dir: &Path,
    ) -> PipelineResult<()> {
        if request.subtitles.is_empty() {
            return Ok(());
        }
        let dir = video_dir.join("subtitles");
        tokio::fs::create_dir_all(&dir).await?;
        for subtitle in &request.subtitles {
            move_file(&subtitle.path, &dir.join(&subtitle.name))
                .await
                .map_err(PipelineError::from_media)?;
        }
        Ok(())
    }

    /// Resolve the poster: explicit upload wins, else the first decodable
    /// frame, else the embedded placeholder.
    async fn place_poster(
        &self,
        request: &IngestRequest,
        video_dir: &Path,
        source_path: &Path,
        url_slug: &str,
    ) -> PipelineResult<String> {
        let poster_path = video_dir.join("thumbnail.jpg");

        if let Some(thumbnail) = &request.thumbnail {
            move_file(&thumbnail.path, &poster_path)
                .await
                .map_err(PipelineError::from_media)?;
        } else if let Err(e) = self.toolbox.extract_poster(source_path, &poster_path).await {
            warn!(error = %e, "poster extraction failed, writing placeholder");
            tokio::fs::write(&poster_path, PLACEHOLDER_POSTER).await?;
        }

        Ok(format!("{}{}/thumbnail.jpg", self.config.base_url(), url_slug))
    }
}

/// Everything one rendition task needs; owned so the task is `'static`.
struct RenditionJob {
    toolbox: Arc<dyn MediaToolbox>,
    video_dir: PathBuf,
    source: PathBuf,
    height: u32,
    reuse_source: bool,
    crf: u8,
    preset: String,
    base_url: String,
    url_slug: String,
    trackers: Vec<String>,
    chunk_factor: u32,
    webtorrent: bool,
}

/// Encode (or reuse) one rendition, verify it, package it, probe it.
async fn produce_rendition(job: RenditionJob) -> PipelineResult<Rendition> {
    let out_path = job.video_dir.join(format!("{}.mp4", job.height));

    if !job.reuse_source {
        job.toolbox
            .encode(&job.source, job.crf, job.height, &job.preset, &out_path)
            .await
            .map_err(PipelineError::from_media)?;
    }

    // A failed or externally killed encode leaves its output absent or
    // truncated; neither may reach the manifest.
    let len = tokio::fs::metadata(&out_path)
        .await
        .map(|m| m.len())
        .unwrap_or(0);
    if len == 0 {
        return Err(PipelineError::internal(format!(
            "encode produced no usable output for {}p",
            job.height
        )));
    }

    let torrent_url = if job.webtorrent {
        let torrent_path = job.video_dir.join(format!("{}.torrent", job.height));
        job.toolbox
            .make_torrent(&out_path, &torrent_path, &job.trackers, job.chunk_factor)
            .await
            .map_err(PipelineError::from_media)?;
        Some(format!(
            "{}{}/{}.torrent",
            job.base_url, job.url_slug, job.height
        ))
    } else {
        None
    };

    let probe = job
        .toolbox
        .probe_rendition(&out_path)
        .await
        .map_err(PipelineError::from_media)?;

    Ok(Rendition {
        height: job.height,
        duration: probe.duration,
        size: probe.size,
        file_url: format!("{}{}/{}.mp4", job.base_url, job.url_slug, job.height),
        torrent_url,
    })
}
