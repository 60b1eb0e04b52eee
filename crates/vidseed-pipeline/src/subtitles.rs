//! Subtitle track discovery.

use std::path::Path;

use vidseed_models::{lang_label, Subtitle};

use crate::error::PipelineResult;

/// Scan `<video_dir>/subtitles` for `.vtt` tracks.
///
/// The language code is the file name stem; the label comes from the static
/// language table. A missing subtitles directory yields an empty list.
pub fn collect_subtitles(video_dir: &Path, url_slug: &str) -> PipelineResult<Vec<Subtitle>> {
    let dir = video_dir.join("subtitles");
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut tracks = Vec::new();
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        let Some(stem) = name.strip_suffix(".vtt") else {
            continue;
        };
        tracks.push(Subtitle {
            file: format!("{url_slug}/subtitles/{name}"),
            srclang: stem.to_string(),
            label: lang_label(stem),
        });
    }

    // Directory order is platform-dependent; sort for a stable manifest.
    tracks.sort_by(|a, b| a.srclang.cmp(&b.srclang));
    Ok(tracks)
}
