//! The `video.json` manifest schema consumed by the player front-ends.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::rendition::Rendition;

/// Subtitle track descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Subtitle {
    /// URL path of the `.vtt` file, relative to the domain root
    pub file: String,

    /// Source language code, taken from the file name stem
    pub srclang: String,

    /// Human-readable label shown in the player track menu
    pub label: String,
}

/// Webtorrent capability flags for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct WebtorrentInfo {
    /// Whether `.torrent` files were generated for this video
    pub enabled: bool,

    /// Whether the player should add the webseed before any peer connects
    pub eager_webseed: bool,
}

/// The durable JSON artifact describing a video to front-end players.
///
/// Field names are a stable wire format; renaming any of them breaks deployed
/// players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoManifest {
    /// Declared title as uploaded
    pub title: String,

    /// Registry id of the video entity
    pub id: i64,

    /// Canonical URL slug, e.g. `/v/My_Movie`
    pub urlslug: String,

    /// Absolute playback URL
    pub url: String,

    /// Domain the artifact URLs are rooted at
    pub domain: String,

    /// Renditions, highest resolution first
    pub videos: Vec<Rendition>,

    /// Subtitle tracks discovered in the `subtitles` subdirectory
    pub subtitles: Vec<Subtitle>,

    /// Poster image URL
    pub poster: String,

    /// Webtorrent capability flags
    pub webtorrent: WebtorrentInfo,
}

impl VideoManifest {
    /// Serialize to the pretty-printed form written to `video.json`.
    ///
    /// Output is byte-identical for identical input.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
