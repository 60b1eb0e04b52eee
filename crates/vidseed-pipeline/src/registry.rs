//! Video registry.
//!
//! The pipeline only consumes this interface; persistence is a boundary
//! concern. The bundled implementation keeps the records in a JSON file under
//! the data root, written atomically so readers never observe a torn file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use vidseed_media::write_atomic;
use vidseed_models::{NewVideo, VideoEntity};

use crate::error::{PipelineError, PipelineResult};

/// Persistent store of video entities.
#[async_trait]
pub trait VideoRegistry: Send + Sync {
    /// Register a new video. Fails with `Conflict` on a duplicate title.
    async fn create(&self, video: NewVideo) -> PipelineResult<VideoEntity>;

    /// Whether a video with this title exists.
    async fn exists(&self, title: &str) -> PipelineResult<bool>;

    /// Look up a video by title.
    async fn get(&self, title: &str) -> PipelineResult<Option<VideoEntity>>;

    /// Remove a video record. Fails with `NotFound` when absent.
    async fn delete(&self, title: &str) -> PipelineResult<()>;

    /// All videos, oldest first.
    async fn list(&self) -> PipelineResult<Vec<VideoEntity>>;

    /// Bump and return the view counter.
    async fn increment_views(&self, title: &str) -> PipelineResult<u64>;
}

/// JSON-file-backed registry.
pub struct JsonRegistry {
    path: PathBuf,
    videos: RwLock<Vec<VideoEntity>>,
}

impl JsonRegistry {
    /// Open (or create) the registry file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> PipelineResult<Arc<Self>> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let videos = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(PipelineError::Io(e)),
        };

        info!(path = %path.display(), "registry opened");
        Ok(Arc::new(Self {
            path,
            videos: RwLock::new(videos),
        }))
    }

    async fn persist(&self, videos: &[VideoEntity]) -> PipelineResult<()> {
        let json = serde_json::to_vec_pretty(videos)?;
        write_atomic(&self.path, &json)
            .await
            .map_err(PipelineError::from_media)
    }
}

#[async_trait]
impl VideoRegistry for JsonRegistry {
    async fn create(&self, video: NewVideo) -> PipelineResult<VideoEntity> {
        let mut videos = self.videos.write().await;
        if videos.iter().any(|v| v.title == video.title) {
            return Err(PipelineError::conflict(format!(
                "video {} already exists",
                video.title
            )));
        }
        let id = videos.iter().map(|v| v.id).max().unwrap_or(0) + 1;
        let entity = VideoEntity::from_new(id, video);
        videos.push(entity.clone());
        self.persist(&videos).await?;
        Ok(entity)
    }

    async fn exists(&self, title: &str) -> PipelineResult<bool> {
        Ok(self.videos.read().await.iter().any(|v| v.title == title))
    }

    async fn get(&self, title: &str) -> PipelineResult<Option<VideoEntity>> {
        Ok(self
            .videos
            .read()
            .await
            .iter()
            .find(|v| v.title == title)
            .cloned())
    }

    async fn delete(&self, title: &str) -> PipelineResult<()> {
        let mut videos = self.videos.write().await;
        let before = videos.len();
        videos.retain(|v| v.title != title);
        if videos.len() == before {
            return Err(PipelineError::not_found(format!("video {title} not found")));
        }
        self.persist(&videos).await
    }

    async fn list(&self) -> PipelineResult<Vec<VideoEntity>> {
        let mut videos = self.videos.read().await.clone();
        videos.sort_by_key(|v| v.id);
        Ok(videos)
    }

    async fn increment_views(&self, title: &str) -> PipelineResult<u64> {
        let mut videos = self.videos.write().await;
        let video = videos
            .iter_mut()
            .find(|v| v.title == title)
            .ok_or_else(|| PipelineError::not_found(format!("video {title} not found")))?;
        video.views += 1;
        let views = video.views;
        self.persist(&videos).await?;
        Ok(views)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_video(title: &str) -> NewVideo {
        NewVideo {
            title: title.to_string(),
            url: format!("http://localhost/v/{title}"),
            description: String::new(),
            path: format!("/data/www/v/{title}/720.mp4"),
            duration: 60.0,
        }
    }

    #[tokio::test]
    async fn test_create_and_duplicate_rejection() {
        let dir = TempDir::new().unwrap();
        let registry = JsonRegistry::open(dir.path().join("videos.json")).await.unwrap();

        let entity = registry.create(new_video("Movie")).await.unwrap();
        assert_eq!(entity.id, 1);
        assert!(registry.exists("Movie").await.unwrap());

        let err = registry.create(new_video("Movie")).await.unwrap_err();
        assert!(matches!(err, PipelineError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_ids_are_monotonic() {
        let dir = TempDir::new().unwrap();
        let registry = JsonRegistry::open(dir.path().join("videos.json")).await.unwrap();

        registry.create(new_video("a")).await.unwrap();
        let b = registry.create(new_video("b")).await.unwrap();
        assert_eq!(b.id, 2);

        registry.delete("a").await.unwrap();
        let c = registry.create(new_video("c")).await.unwrap();
        assert_eq!(c.id, 3);
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("videos.json");

        {
            let registry = JsonRegistry::open(&path).await.unwrap();
            registry.create(new_video("Movie")).await.unwrap();
            registry.increment_views("Movie").await.unwrap();
        }

        let registry = JsonRegistry::open(&path).await.unwrap();
        let video = registry.get("Movie").await.unwrap().unwrap();
        assert_eq!(video.views, 1);
    }

    #[tokio::test]
    async fn test_delete_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let registry = JsonRegistry::open(dir.path().join("videos.json")).await.unwrap();

        let err = registry.delete("ghost").await.unwrap_err();
        assert!(matches!(err, PipelineError::NotFound(_)));
    }
}
