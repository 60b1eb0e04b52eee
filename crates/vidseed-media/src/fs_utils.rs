//! Filesystem utilities.
//!
//! Uploads land in a scratch directory that may live on a different
//! filesystem than the video root, so moves must handle EXDEV. Manifest
//! writes go through a temp-file-then-rename so readers only ever observe a
//! complete file.

use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Move a file from `src` to `dst`, handling cross-device moves.
///
/// Attempts a fast rename first; on EXDEV falls back to copy-into-temp plus
/// rename so the destination never holds a partially copied file.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            debug!(
                "cross-device rename, falling back to copy+delete: {} -> {}",
                src.display(),
                dst.display()
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Write `contents` to `path` atomically via a sibling temp file and rename.
///
/// A concurrent reader sees either the previous complete file or the new
/// complete file, never a truncated one.
pub async fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> MediaResult<()> {
    let path = path.as_ref();
    let tmp = tmp_sibling(path);

    fs::write(&tmp, contents).await?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(MediaError::from(e));
    }
    Ok(())
}

fn tmp_sibling(path: &Path) -> std::path::PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Check if an IO error is EXDEV (cross-device link).
fn is_cross_device_error(e: &std::io::Error) -> bool {
    e.raw_os_error() == Some(18)
}

/// Copy file to destination (via temp file) then delete source.
async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    let tmp = tmp_sibling(dst);

    fs::copy(src, &tmp).await.map_err(|e| {
        warn!(
            "copy failed during cross-device move: {} -> {}: {}",
            src.display(),
            tmp.display(),
            e
        );
        MediaError::from(e)
    })?;

    fs::rename(&tmp, dst).await.map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        MediaError::from(e)
    })?;

    // Source removal is best effort; the move itself already succeeded.
    if let Err(e) = fs::remove_file(src).await {
        warn!("failed to remove source after cross-device move: {}: {}", src.display(), e);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_move_file_same_filesystem() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("source.mp4");
        let dst = dir.path().join("720.mp4");

        fs::write(&src, b"payload").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).await.unwrap(), b"payload");
    }

    #[tokio::test]
    async fn test_move_file_creates_parent() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("en.vtt");
        let dst = dir.path().join("subtitles").join("en.vtt");

        fs::write(&src, b"WEBVTT").await.unwrap();
        move_file(&src, &dst).await.unwrap();

        assert!(dst.exists());
    }

    #[tokio::test]
    async fn test_write_atomic_replaces_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("video.json");

        write_atomic(&path, b"{\"v\":1}").await.unwrap();
        write_atomic(&path, b"{\"v\":2}").await.unwrap();

        assert_eq!(fs::read(&path).await.unwrap(), b"{\"v\":2}");
        assert!(!tmp_sibling(&path).exists(), "temp file left behind");
    }

    #[test]
    fn test_is_cross_device_error() {
        assert!(is_cross_device_error(&std::io::Error::from_raw_os_error(18)));
        assert!(!is_cross_device_error(&std::io::Error::from_raw_os_error(2)));
    }
}
