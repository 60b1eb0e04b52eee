//! Rendition records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One encoded output resolution plus its packaging artifacts.
///
/// Immutable once probed; the manifest only ever references renditions whose
/// files exist on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Rendition {
    /// Vertical resolution in pixels
    pub height: u32,

    /// Duration in seconds, probed from the produced file
    pub duration: f64,

    /// Size in bytes of the produced file
    pub size: u64,

    /// Webseed URL serving the rendition over plain HTTP
    pub file_url: String,

    /// Torrent URL; absent when torrent generation is disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrent_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torrent_url_omitted_when_disabled() {
        let rendition = Rendition {
            height: 720,
            duration: 12.5,
            size: 1024,
            file_url: "https://example.com/v/movie/720.mp4".to_string(),
            torrent_url: None,
        };
        let json = serde_json::to_value(&rendition).unwrap();
        assert!(json.get("torrent_url").is_none());
        assert_eq!(json["height"], 720);
    }

    #[test]
    fn test_stable_field_names() {
        let rendition = Rendition {
            height: 480,
            duration: 1.0,
            size: 2,
            file_url: "f".to_string(),
            torrent_url: Some("t".to_string()),
        };
        let json = serde_json::to_value(&rendition).unwrap();
        for key in ["height", "duration", "size", "file_url", "torrent_url"] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
    }
}
