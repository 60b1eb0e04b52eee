//! External tool adapters for vidseed.
//!
//! This crate wraps the three black-box binaries the pipeline shells out to:
//! - `ffprobe` for stream/format inspection
//! - `ffmpeg` for rendition encoding and poster extraction
//! - `mktorrent` for torrent file generation
//!
//! All adapters check PATH with `which` before spawning so a missing binary
//! surfaces as a distinct, deployment-diagnosable error.

pub mod command;
pub mod encode;
pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod thumbnail;
pub mod torrent;

pub use command::{check_ffmpeg, check_ffprobe, check_mktorrent, FfmpegCommand, FfmpegRunner};
pub use encode::encode;
pub use error::{MediaError, MediaResult};
pub use fs_utils::{move_file, write_atomic};
pub use probe::{probe_duration, probe_height, probe_rendition, RenditionProbe};
pub use thumbnail::{extract_first_frame, image_dimensions, PLACEHOLDER_POSTER};
pub use torrent::make_torrent;
