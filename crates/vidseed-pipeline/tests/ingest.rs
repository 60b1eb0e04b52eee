//! End-to-end pipeline tests against a deterministic fake toolbox.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use vidseed_media::{MediaError, MediaResult, RenditionProbe};
use vidseed_pipeline::{
    IngestRequest, JsonRegistry, MediaToolbox, Pipeline, PipelineConfig, PipelineError,
    StagedFile, VideoRegistry,
};

/// Toolbox that fabricates outputs instead of shelling out.
#[derive(Debug, Clone, Default)]
struct FakeToolbox {
    native_height: u32,
    fail_encode_heights: Vec<u32>,
    mktorrent_missing: bool,
    fail_poster: bool,
}

impl FakeToolbox {
    fn with_native(height: u32) -> Self {
        Self {
            native_height: height,
            ..Default::default()
        }
    }
}

#[async_trait]
impl MediaToolbox for FakeToolbox {
    async fn probe_height(&self, path: &Path) -> MediaResult<u32> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        Ok(self.native_height)
    }

    async fn probe_rendition(&self, path: &Path) -> MediaResult<RenditionProbe> {
        let size = tokio::fs::metadata(path).await?.len();
        Ok(RenditionProbe {
            duration: 42.5,
            size,
        })
    }

    async fn encode(
        &self,
        _src: &Path,
        _crf: u8,
        height: u32,
        _preset: &str,
        dst: &Path,
    ) -> MediaResult<()> {
        if self.fail_encode_heights.contains(&height) {
            return Err(MediaError::ffmpeg_failed("simulated encode failure", None, Some(1)));
        }
        tokio::fs::write(dst, format!("encoded-{height}")).await?;
        Ok(())
    }

    async fn make_torrent(
        &self,
        _media: &Path,
        torrent: &Path,
        _trackers: &[String],
        _chunk_factor: u32,
    ) -> MediaResult<()> {
        if self.mktorrent_missing {
            return Err(MediaError::MktorrentNotFound);
        }
        tokio::fs::write(torrent, b"d8:announce0:e").await?;
        Ok(())
    }

    async fn extract_poster(&self, _video: &Path, dst: &Path) -> MediaResult<()> {
        if self.fail_poster {
            return Err(MediaError::ffmpeg_failed("no decodable frame", None, Some(1)));
        }
        tokio::fs::write(dst, b"poster").await?;
        Ok(())
    }

    fn image_dimensions(&self, _path: &Path) -> MediaResult<(u32, u32)> {
        Ok((640, 360))
    }
}

struct Harness {
    _root: TempDir,
    scratch: TempDir,
    pipeline: Pipeline,
    registry: Arc<JsonRegistry>,
    config: PipelineConfig,
}

impl Harness {
    async fn new(toolbox: FakeToolbox, tune: impl FnOnce(&mut PipelineConfig)) -> Self {
        let root = TempDir::new().unwrap();
        let mut config = PipelineConfig::default().with_data_root(root.path());
        config.encode_workers = 2;
        tune(&mut config);

        let registry = JsonRegistry::open(config.data_root.join("videos.json"))
            .await
            .unwrap();
        let registry_dyn: Arc<dyn VideoRegistry> = registry.clone();
        let pipeline = Pipeline::new(config.clone(), registry_dyn, Arc::new(toolbox));

        Self {
            _root: root,
            scratch: TempDir::new().unwrap(),
            pipeline,
            registry,
            config,
        }
    }

    fn stage(&self, name: &str, contents: &[u8]) -> StagedFile {
        let path = self.scratch.path().join(format!("staged-{name}"));
        std::fs::write(&path, contents).unwrap();
        StagedFile::new(name, path)
    }

    fn request(&self, title: &str, transcode: bool) -> IngestRequest {
        IngestRequest {
            title: title.to_string(),
            description: "a test video".to_string(),
            source: self.stage("vid.mp4", b"source-bytes"),
            thumbnail: None,
            subtitles: Vec::new(),
            transcode,
        }
    }

    fn video_dir(&self, slug: &str) -> PathBuf {
        self.config.video_dir(slug)
    }
}

fn url_file_name(url: &str) -> String {
    url.rsplit('/').next().unwrap().to_string()
}

#[tokio::test]
async fn transcode_720p_source_yields_720_and_480() {
    let harness = Harness::new(FakeToolbox::with_native(720), |_| {}).await;

    let outcome = harness
        .pipeline
        .ingest(harness.request("Test Movie", true))
        .await
        .unwrap();

    assert_eq!(outcome.renditions, 2);

    let dir = harness.video_dir("Test_Movie");
    for height in [720, 480] {
        assert!(dir.join(format!("{height}.mp4")).exists());
        assert!(dir.join(format!("{height}.torrent")).exists());
    }
    assert!(!dir.join("1080.mp4").exists(), "1080 exceeds native height");

    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.join("video.json")).unwrap()).unwrap();
    assert_eq!(manifest["videos"].as_array().unwrap().len(), 2);
    assert_eq!(manifest["videos"][0]["height"], 720);
    assert_eq!(manifest["videos"][1]["height"], 480);
}

#[tokio::test]
async fn manifest_references_only_existing_files() {
    let harness = Harness::new(FakeToolbox::with_native(1080), |_| {}).await;

    harness
        .pipeline
        .ingest(harness.request("Integrity", true))
        .await
        .unwrap();

    let dir = harness.video_dir("Integrity");
    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.join("video.json")).unwrap()).unwrap();

    for video in manifest["videos"].as_array().unwrap() {
        let file = url_file_name(video["file_url"].as_str().unwrap());
        assert!(dir.join(&file).exists(), "missing {file}");
        let torrent = url_file_name(video["torrent_url"].as_str().unwrap());
        assert!(dir.join(&torrent).exists(), "missing {torrent}");
    }
}

#[tokio::test]
async fn no_transcode_is_single_native_rendition() {
    let harness = Harness::new(FakeToolbox::with_native(568), |_| {}).await;

    let outcome = harness
        .pipeline
        .ingest(harness.request("Raw Upload", false))
        .await
        .unwrap();

    assert_eq!(outcome.renditions, 1);

    let dir = harness.video_dir("Raw_Upload");
    assert!(dir.join("568.mp4").exists());
    assert_eq!(
        std::fs::read(dir.join("568.mp4")).unwrap(),
        b"source-bytes",
        "passthrough upload must be repackaged, not re-encoded"
    );

    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.join("video.json")).unwrap()).unwrap();
    assert_eq!(manifest["videos"].as_array().unwrap().len(), 1);
    assert_eq!(manifest["videos"][0]["height"], 568);
}

#[tokio::test]
async fn bad_extension_rejected_before_any_mutation() {
    let harness = Harness::new(FakeToolbox::with_native(720), |_| {}).await;

    let mut request = harness.request("Quicktime", false);
    request.source = harness.stage("clip.mov", b"mov-bytes");

    let err = harness.pipeline.ingest(request).await.unwrap_err();
    assert!(matches!(err, PipelineError::UnsupportedMedia(_)));

    assert!(!harness.video_dir("Quicktime").exists());
    assert!(harness.registry.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_torrent_binary_fails_and_cleans_up() {
    let toolbox = FakeToolbox {
        native_height: 720,
        mktorrent_missing: true,
        ..Default::default()
    };
    let harness = Harness::new(toolbox, |config| config.encoding.heights = Vec::new()).await;

    let err = harness
        .pipeline
        .ingest(harness.request("Doomed", false))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::ToolingUnavailable(_)));

    assert!(!harness.video_dir("Doomed").exists(), "partial directory survived");
    assert!(!harness.registry.exists("Doomed").await.unwrap());
}

#[tokio::test]
async fn concurrent_duplicate_titles_one_wins() {
    let harness = Arc::new(Harness::new(FakeToolbox::with_native(480), |_| {}).await);

    let first = harness.pipeline.ingest(harness.request("Same Title", false));
    let second = harness.pipeline.ingest(harness.request("Same Title", false));
    let (a, b) = tokio::join!(first, second);

    let (winner, loser) = if a.is_ok() { (a, b) } else { (b, a) };
    assert!(winner.is_ok());
    assert!(matches!(loser.unwrap_err(), PipelineError::Conflict(_)));

    // The loser must not have clobbered the winner's artifacts.
    let dir = harness.video_dir("Same_Title");
    assert!(dir.join("video.json").exists());
    assert_eq!(harness.registry.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn partial_rendition_failure_still_publishes() {
    let toolbox = FakeToolbox {
        native_height: 720,
        fail_encode_heights: vec![480],
        ..Default::default()
    };
    let harness = Harness::new(toolbox, |_| {}).await;

    let outcome = harness
        .pipeline
        .ingest(harness.request("Mostly Fine", true))
        .await
        .unwrap();

    // 480 failed, 720 (source reuse) survived; best-effort publishes.
    assert_eq!(outcome.renditions, 1);
    let dir = harness.video_dir("Mostly_Fine");
    assert!(dir.join("720.mp4").exists());
    assert!(!dir.join("480.mp4").exists());
}

#[tokio::test]
async fn min_renditions_policy_can_make_partial_failure_fatal() {
    let toolbox = FakeToolbox {
        native_height: 720,
        fail_encode_heights: vec![480],
        ..Default::default()
    };
    let harness = Harness::new(toolbox, |config| config.min_renditions = 2).await;

    let err = harness
        .pipeline
        .ingest(harness.request("Strict", true))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoRenditions));

    assert!(!harness.video_dir("Strict").exists());
    assert!(harness.registry.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn subtitles_are_discovered_and_labeled() {
    let harness = Harness::new(FakeToolbox::with_native(720), |_| {}).await;

    let mut request = harness.request("Subtitled", false);
    request.subtitles = vec![
        harness.stage("en.vtt", b"WEBVTT"),
        harness.stage("es-LA.vtt", b"WEBVTT"),
    ];

    harness.pipeline.ingest(request).await.unwrap();

    let dir = harness.video_dir("Subtitled");
    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.join("video.json")).unwrap()).unwrap();

    let subtitles = manifest["subtitles"].as_array().unwrap();
    assert_eq!(subtitles.len(), 2);
    assert_eq!(subtitles[0]["srclang"], "en");
    assert_eq!(subtitles[0]["label"], "English");
    assert_eq!(subtitles[1]["srclang"], "es-LA");
    assert_eq!(subtitles[1]["label"], "Spanish");
    assert!(dir.join("subtitles/en.vtt").exists());
    assert!(dir.join("subtitles/es-LA.vtt").exists());
}

#[tokio::test]
async fn webtorrent_disabled_skips_torrents() {
    let harness = Harness::new(FakeToolbox::with_native(720), |config| {
        config.webtorrent_enabled = false;
    })
    .await;

    harness
        .pipeline
        .ingest(harness.request("No Torrents", true))
        .await
        .unwrap();

    let dir = harness.video_dir("No_Torrents");
    assert!(!dir.join("720.torrent").exists());

    let manifest: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.join("video.json")).unwrap()).unwrap();
    assert_eq!(manifest["webtorrent"]["enabled"], false);
    for video in manifest["videos"].as_array().unwrap() {
        assert!(video.get("torrent_url").is_none());
    }
}

#[tokio::test]
async fn explicit_thumbnail_is_used_and_oversized_one_rejected() {
    let harness = Harness::new(FakeToolbox::with_native(720), |_| {}).await;

    let mut request = harness.request("With Poster", false);
    request.thumbnail = Some(harness.stage("poster.jpg", b"jpeg-bytes"));
    harness.pipeline.ingest(request).await.unwrap();

    let dir = harness.video_dir("With_Poster");
    assert_eq!(std::fs::read(dir.join("thumbnail.jpg")).unwrap(), b"jpeg-bytes");

    // Fake reports 640x360; a 100px bound makes the next upload oversized.
    let strict = Harness::new(FakeToolbox::with_native(720), |config| {
        config.max_thumbnail_dimension = 100;
    })
    .await;
    let mut request = strict.request("Big Poster", false);
    request.thumbnail = Some(strict.stage("poster.jpg", b"jpeg-bytes"));

    let err = strict.pipeline.ingest(request).await.unwrap_err();
    assert!(matches!(err, PipelineError::Validation(_)));
    assert!(!strict.video_dir("Big_Poster").exists());
}

#[tokio::test]
async fn poster_extraction_failure_falls_back_to_placeholder() {
    let toolbox = FakeToolbox {
        native_height: 720,
        fail_poster: true,
        ..Default::default()
    };
    let harness = Harness::new(toolbox, |_| {}).await;

    harness
        .pipeline
        .ingest(harness.request("No Frames", false))
        .await
        .unwrap();

    let poster = std::fs::read(harness.video_dir("No_Frames").join("thumbnail.jpg")).unwrap();
    assert_eq!(poster, vidseed_media::PLACEHOLDER_POSTER);
}

#[tokio::test]
async fn delete_removes_directory_and_registry_entry() {
    let harness = Harness::new(FakeToolbox::with_native(720), |_| {}).await;

    harness
        .pipeline
        .ingest(harness.request("Ephemeral", false))
        .await
        .unwrap();
    assert!(harness.video_dir("Ephemeral").exists());

    harness.pipeline.delete_video("Ephemeral").await.unwrap();
    assert!(!harness.video_dir("Ephemeral").exists());
    assert!(!harness.registry.exists("Ephemeral").await.unwrap());

    let err = harness.pipeline.delete_video("Ephemeral").await.unwrap_err();
    assert!(matches!(err, PipelineError::NotFound(_)));
}

#[tokio::test]
async fn mkv_source_is_encoded_not_renamed() {
    let harness = Harness::new(FakeToolbox::with_native(720), |_| {}).await;

    let mut request = harness.request("Matroska", true);
    request.source = harness.stage("vid.mkv", b"mkv-bytes");

    harness.pipeline.ingest(request).await.unwrap();

    let dir = harness.video_dir("Matroska");
    // The raw mkv bytes must not be served as an mp4 rendition.
    assert_eq!(std::fs::read(dir.join("720.mp4")).unwrap(), b"encoded-720");
    assert_eq!(std::fs::read(dir.join("480.mp4")).unwrap(), b"encoded-480");
}
