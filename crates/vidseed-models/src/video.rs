//! Registry video records.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A published video as recorded by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoEntity {
    /// Registry-assigned id
    pub id: i64,

    /// Declared title; unique across the registry
    pub title: String,

    /// Canonical playback URL; unique
    pub url: String,

    /// Free-form description
    #[serde(default)]
    pub description: String,

    /// On-disk path of the primary rendition
    pub path: String,

    /// Publication timestamp
    pub published: DateTime<Utc>,

    /// Last-updated timestamp
    pub updated: DateTime<Utc>,

    /// View counter
    #[serde(default)]
    pub views: u64,

    /// Duration in seconds of the primary rendition
    #[serde(default)]
    pub duration: f64,
}

/// Fields supplied when registering a freshly ingested video.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub title: String,
    pub url: String,
    pub description: String,
    pub path: String,
    pub duration: f64,
}

impl VideoEntity {
    /// Build an entity from registration fields.
    pub fn from_new(id: i64, new: NewVideo) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: new.title,
            url: new.url,
            description: new.description,
            path: new.path,
            published: now,
            updated: now,
            views: 0,
            duration: new.duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_new() {
        let entity = VideoEntity::from_new(
            3,
            NewVideo {
                title: "t".to_string(),
                url: "u".to_string(),
                description: "d".to_string(),
                path: "p".to_string(),
                duration: 9.5,
            },
        );
        assert_eq!(entity.id, 3);
        assert_eq!(entity.views, 0);
        assert_eq!(entity.published, entity.updated);
    }
}
