//! Shared data models for the vidseed backend.
//!
//! This crate provides Serde-serializable types for:
//! - Renditions and the `video.json` manifest schema
//! - Registry video records
//! - Encoding defaults and settings
//! - Title sanitization and subtitle language labels

pub mod encoding;
pub mod lang;
pub mod manifest;
pub mod rendition;
pub mod slug;
pub mod video;

// Re-export common types
pub use encoding::EncodingSettings;
pub use lang::lang_label;
pub use manifest::{Subtitle, VideoManifest, WebtorrentInfo};
pub use rendition::Rendition;
pub use slug::sanitize_title;
pub use video::{NewVideo, VideoEntity};
