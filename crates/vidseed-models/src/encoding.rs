//! Encoding defaults and settings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default CRF for rendition encodes (higher than archival quality; these are
/// streaming copies of a source that is kept as-is)
pub const DEFAULT_CRF: u8 = 28;
/// Default x264 preset
pub const DEFAULT_PRESET: &str = "veryslow";
/// Heights encoded when transcoding is requested
pub const DEFAULT_HEIGHTS: [u32; 3] = [1080, 720, 480];
/// Renditions at or below this height get a mono audio downmix
pub const MONO_DOWNMIX_MAX_HEIGHT: u32 = 480;
/// Torrent piece size exponent (2^17 = 128 KiB pieces)
pub const DEFAULT_CHUNK_FACTOR: u32 = 17;
/// Largest accepted dimension for an uploaded poster image
pub const MAX_THUMBNAIL_DIMENSION: u32 = 4096;

/// Encoding settings for one ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EncodingSettings {
    /// Constant Rate Factor (0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// x264 preset (e.g., "fast", "medium", "veryslow")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Target heights, filtered against the source's native height at plan time
    #[serde(default = "default_heights")]
    pub heights: Vec<u32>,
}

fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_heights() -> Vec<u32> {
    DEFAULT_HEIGHTS.to_vec()
}

impl Default for EncodingSettings {
    fn default() -> Self {
        Self {
            crf: DEFAULT_CRF,
            preset: DEFAULT_PRESET.to_string(),
            heights: DEFAULT_HEIGHTS.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EncodingSettings::default();
        assert_eq!(settings.crf, 28);
        assert_eq!(settings.preset, "veryslow");
        assert_eq!(settings.heights, vec![1080, 720, 480]);
    }

    #[test]
    fn test_deserialize_fills_defaults() {
        let settings: EncodingSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.crf, DEFAULT_CRF);
        assert_eq!(settings.heights, DEFAULT_HEIGHTS.to_vec());
    }
}
