//! Manifest writing and static asset sync.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use vidseed_media::write_atomic;
use vidseed_models::VideoManifest;

use crate::error::{PipelineError, PipelineResult};
use crate::lock::StartupLock;

/// Player shell copied next to every `video.json`.
const PLAYER_SHELL: &str = include_str!("../assets/player.html");

/// Landing page written to the www root on startup.
const REDIRECT_PAGE: &str = include_str!("../assets/redirect.html");

/// Serialize the manifest and write it atomically as `video.json`.
///
/// Re-invoking with identical inputs produces byte-identical output.
pub async fn write_manifest(video_dir: &Path, manifest: &VideoManifest) -> PipelineResult<PathBuf> {
    let path = video_dir.join("video.json");
    let json = manifest.to_json_pretty()?;
    write_atomic(&path, json.as_bytes())
        .await
        .map_err(PipelineError::from_media)?;
    info!(path = %path.display(), renditions = manifest.videos.len(), "manifest written");
    Ok(path)
}

/// Copy the player shell into the video directory, but only when its content
/// hash differs from what is already there. Avoids needless writes and cache
/// invalidation on unrelated redeploys.
pub fn sync_player_shell(video_dir: &Path) -> PipelineResult<bool> {
    sync_content(PLAYER_SHELL.as_bytes(), &video_dir.join("index.html"))
}

/// One-time static asset initialization under the startup lock.
///
/// Safe to call from multiple process instances sharing a deploy directory.
pub fn init_static_assets(www_root: &Path, lock_path: &Path) -> PipelineResult<()> {
    std::fs::create_dir_all(www_root)?;
    let _lock = StartupLock::acquire(lock_path, Duration::from_secs(10))?;
    sync_content(REDIRECT_PAGE.as_bytes(), &www_root.join("index.html"))?;
    Ok(())
}

/// Write `contents` to `dst` only if the destination's hash differs.
fn sync_content(contents: &[u8], dst: &Path) -> PipelineResult<bool> {
    if dst.exists() && file_sha256(dst)? == sha256(contents) {
        debug!(dst = %dst.display(), "asset unchanged, skipping sync");
        return Ok(false);
    }
    std::fs::write(dst, contents)?;
    debug!(dst = %dst.display(), "asset synced");
    Ok(true)
}

fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

fn file_sha256(path: &Path) -> std::io::Result<[u8; 32]> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().into())
}
