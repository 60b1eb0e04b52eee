//! mktorrent adapter.

use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::info;

use crate::error::{MediaError, MediaResult};

/// Create a `.torrent` file for `media` announcing to `trackers`.
///
/// Torrent files cover the whole file's content hash and cannot be updated
/// incrementally, so any stale file at `torrent` is deleted first. Pieces are
/// sized `2^chunk_factor` bytes.
pub async fn make_torrent(
    media: impl AsRef<Path>,
    torrent: impl AsRef<Path>,
    trackers: &[String],
    chunk_factor: u32,
) -> MediaResult<()> {
    let media = media.as_ref();
    let torrent = torrent.as_ref();

    if !media.exists() {
        return Err(MediaError::FileNotFound(media.to_path_buf()));
    }
    if torrent.exists() {
        tokio::fs::remove_file(torrent).await?;
    }

    // PATH lookup before spawning: a missing binary is a deployment problem
    // and gets its own error kind.
    which::which("mktorrent").map_err(|_| MediaError::MktorrentNotFound)?;

    let mut command = Command::new("mktorrent");
    command.arg(media);
    for tracker in trackers {
        command.arg("-a").arg(tracker);
    }
    command
        .arg("-l")
        .arg(chunk_factor.to_string())
        .arg("-o")
        .arg(torrent);

    info!(media = %media.display(), torrent = %torrent.display(), "creating torrent");

    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        return Err(MediaError::torrent_failed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
            output.status.code(),
        ));
    }

    if !torrent.exists() {
        return Err(MediaError::torrent_failed(
            format!("mktorrent reported success but {} is missing", torrent.display()),
            None,
        ));
    }

    info!(torrent = %torrent.display(), "torrent created");
    Ok(())
}
