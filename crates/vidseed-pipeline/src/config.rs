//! Pipeline configuration.
//!
//! Assembled once at process start and passed by reference into the
//! orchestrator; nothing in the pipeline reads the environment at use-sites.

use std::path::{Path, PathBuf};

use vidseed_models::encoding::{DEFAULT_CHUNK_FACTOR, MAX_THUMBNAIL_DIMENSION};
use vidseed_models::EncodingSettings;

/// Configuration for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Root of all persistent data
    pub data_root: PathBuf,
    /// Publicly served static root (`<data_root>/www`)
    pub www_root: PathBuf,
    /// Per-video directories live here (`<www_root>/v`)
    pub video_root: PathBuf,
    /// Domain the artifact URLs are rooted at
    pub domain: String,
    /// Tracker announce URLs baked into every torrent
    pub trackers: Vec<String>,
    /// Torrent piece size exponent
    pub chunk_factor: u32,
    /// CRF, preset and target heights for rendition encodes
    pub encoding: EncodingSettings,
    /// Worker count of the encoder pool; bounds system-wide concurrent transcodes
    pub encode_workers: usize,
    /// Submission queue bound; submissions beyond it are rejected
    pub max_queued_tasks: usize,
    /// Whether `.torrent` files are generated at all
    pub webtorrent_enabled: bool,
    /// Whether players should add the webseed before any peer connects
    pub eager_webseed: bool,
    /// Largest accepted dimension for an uploaded poster image
    pub max_thumbnail_dimension: u32,
    /// Minimum completed renditions for a run to count as a success
    pub min_renditions: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let data_root = PathBuf::from("var/data");
        let www_root = data_root.join("www");
        let video_root = www_root.join("v");
        Self {
            data_root,
            www_root,
            video_root,
            domain: "localhost".to_string(),
            trackers: vec![
                "wss://webtorrent-tracker.onrender.com".to_string(),
                "wss://tracker.btorrent.xyz".to_string(),
            ],
            chunk_factor: DEFAULT_CHUNK_FACTOR,
            encoding: EncodingSettings::default(),
            encode_workers: 4,
            max_queued_tasks: 64,
            webtorrent_enabled: true,
            eager_webseed: true,
            max_thumbnail_dimension: MAX_THUMBNAIL_DIMENSION,
            min_renditions: 1,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let data_root = std::env::var("DATA_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_root);
        let www_root = data_root.join("www");
        let video_root = www_root.join("v");

        Self {
            data_root,
            www_root,
            video_root,
            domain: std::env::var("DOMAIN_NAME").unwrap_or(defaults.domain),
            trackers: std::env::var("TRACKER_ANNOUNCE_LIST")
                .map(|s| s.split(',').map(|t| t.trim().to_string()).collect())
                .unwrap_or(defaults.trackers),
            chunk_factor: parse_env("CHUNK_FACTOR", defaults.chunk_factor),
            encoding: EncodingSettings {
                crf: parse_env("ENCODING_CRF", defaults.encoding.crf),
                preset: std::env::var("ENCODER_PRESET").unwrap_or(defaults.encoding.preset),
                heights: std::env::var("ENCODING_HEIGHTS")
                    .map(|s| s.split(',').filter_map(|h| h.trim().parse().ok()).collect())
                    .unwrap_or(defaults.encoding.heights),
            },
            encode_workers: parse_env("NUMBER_OF_ENCODING_THREADS", defaults.encode_workers),
            max_queued_tasks: parse_env("MAX_QUEUED_TASKS", defaults.max_queued_tasks),
            webtorrent_enabled: std::env::var("WEBTORRENT_ENABLED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.webtorrent_enabled),
            eager_webseed: std::env::var("EAGER_WEBSEED")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.eager_webseed),
            max_thumbnail_dimension: parse_env(
                "MAX_THUMBNAIL_DIMENSION",
                defaults.max_thumbnail_dimension,
            ),
            min_renditions: parse_env("MIN_RENDITIONS", defaults.min_renditions),
        }
    }

    /// Scheme-qualified base URL, no trailing slash.
    pub fn base_url(&self) -> String {
        let scheme = if self.domain.contains("localhost") {
            "http"
        } else {
            "https"
        };
        format!("{scheme}://{}", self.domain)
    }

    /// URL slug for a sanitized title, e.g. `/v/My_Movie`.
    pub fn url_slug(&self, slug: &str) -> String {
        format!("/v/{slug}")
    }

    /// Absolute playback URL for a sanitized title.
    pub fn playback_url(&self, slug: &str) -> String {
        format!("{}{}", self.base_url(), self.url_slug(slug))
    }

    /// Per-video directory for a sanitized title.
    pub fn video_dir(&self, slug: &str) -> PathBuf {
        self.video_root.join(slug)
    }

    /// Root for scratch downloads, kept outside the public static root.
    pub fn scratch_root(&self) -> PathBuf {
        self.data_root.join("tmp")
    }

    /// Lock file guarding one-time static asset initialization.
    pub fn startup_lock_path(&self) -> PathBuf {
        self.data_root.join("startup.lock")
    }

    /// Re-root all paths under `root` (used by tests).
    pub fn with_data_root(mut self, root: impl AsRef<Path>) -> Self {
        self.data_root = root.as_ref().to_path_buf();
        self.www_root = self.data_root.join("www");
        self.video_root = self.www_root.join("v");
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_scheme_selection() {
        let mut config = PipelineConfig::default();
        assert_eq!(config.base_url(), "http://localhost");

        config.domain = "videos.example.com".to_string();
        assert_eq!(config.base_url(), "https://videos.example.com");
    }

    #[test]
    fn test_playback_url() {
        let mut config = PipelineConfig::default();
        config.domain = "videos.example.com".to_string();
        assert_eq!(
            config.playback_url("My_Movie"),
            "https://videos.example.com/v/My_Movie"
        );
    }

    #[test]
    fn test_with_data_root_reroots_children() {
        let config = PipelineConfig::default().with_data_root("/srv/vidseed");
        assert_eq!(config.www_root, PathBuf::from("/srv/vidseed/www"));
        assert_eq!(config.video_root, PathBuf::from("/srv/vidseed/www/v"));
    }
}
