//! Poster frame extraction and image inspection.

use std::path::Path;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// 1x1 black PNG written when no poster can be produced at all.
pub const PLACEHOLDER_POSTER: &[u8] = &[
    137, 80, 78, 71, 13, 10, 26, 10, 0, 0, 0, 13, 73, 72, 68, 82, 0, 0, 0, 1, 0, 0, 0, 1, 8, 2, 0,
    0, 0, 144, 119, 83, 222, 0, 0, 0, 1, 115, 82, 71, 66, 0, 174, 206, 28, 233, 0, 0, 0, 12, 73,
    68, 65, 84, 24, 87, 99, 136, 89, 39, 8, 0, 2, 133, 1, 28, 26, 189, 185, 242, 0, 0, 0, 0, 73,
    69, 78, 68, 174, 66, 96, 130,
];

/// Extract the first decodable frame of `video` as a poster image.
pub async fn extract_first_frame(
    video: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(video.as_ref(), output.as_ref())
        .video_filter("select=eq(n\\,0)")
        .output_arg("-q:v")
        .output_arg("3")
        .single_frame();

    FfmpegRunner::new().run(&cmd).await
}

/// Read the pixel dimensions of an image without decoding it fully.
pub fn image_dimensions(path: impl AsRef<Path>) -> MediaResult<(u32, u32)> {
    let path = path.as_ref();
    image::image_dimensions(path)
        .map_err(|e| MediaError::InvalidImage(format!("{}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_placeholder_is_a_readable_png() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("thumbnail.png");
        std::fs::write(&path, PLACEHOLDER_POSTER).unwrap();

        let (w, h) = image_dimensions(&path).unwrap();
        assert_eq!((w, h), (1, 1));
    }

    #[test]
    fn test_image_dimensions_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not_an_image.jpg");
        std::fs::write(&path, b"definitely not pixels").unwrap();

        assert!(matches!(
            image_dimensions(&path),
            Err(MediaError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_first_frame_command_shape() {
        let cmd = FfmpegCommand::new("in.mp4", "out.jpg")
            .video_filter("select=eq(n\\,0)")
            .output_arg("-q:v")
            .output_arg("3")
            .single_frame();
        let args = cmd.build_args();
        assert!(args.contains(&"-vframes".to_string()));
        assert!(args.contains(&"select=eq(n\\,0)".to_string()));
    }
}
