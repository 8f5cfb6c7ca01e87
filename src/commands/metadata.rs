use std::path::Path;
use chrono::NaiveDateTime;
use log::debug;

use crate::config::Config;
use crate::error::{ImportError, MetadataError};
use crate::models::MediaType;
use crate::utils::{creation_time, decode_first_frame, probe_creation_time, summarize_exif};

/// Everything the importer learns about a file before renaming it.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaMetadata {
    pub media_type: MediaType,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub captured_at: NaiveDateTime,
    /// EXIF orientation of images, when tagged.
    pub orientation: Option<u32>,
}

/// Classify `path` and work out its dimensions and capture time.
///
/// Only an undecodable image or video frame is an error. Unreadable or missing
/// embedded dates fall back to the filesystem creation time.
pub fn extract_metadata(path: &Path, config: &Config) -> Result<MediaMetadata, ImportError> {
    match config.suffixes.classify(path) {
        MediaType::Image => extract_image(path),
        MediaType::Video => extract_video(path, config),
        media_type => Ok(MediaMetadata {
            media_type,
            width: None,
            height: None,
            captured_at: fallback_timestamp(path)?,
            orientation: None,
        }),
    }
}

fn extract_image(path: &Path) -> Result<MediaMetadata, ImportError> {
    let img = image::open(path).map_err(|source| ImportError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let summary = summarize_exif(path).unwrap_or_else(|e| {
        debug!("No EXIF in {}: {}", path.display(), e);
        Default::default()
    });

    let captured_at = match summary.date_taken {
        Some(dt) => dt,
        None => fallback_timestamp(path)?,
    };

    Ok(MediaMetadata {
        media_type: MediaType::Image,
        width: Some(img.width()),
        height: Some(img.height()),
        captured_at,
        orientation: summary.orientation,
    })
}

fn extract_video(path: &Path, config: &Config) -> Result<MediaMetadata, ImportError> {
    let frame = decode_first_frame(&config.ffmpeg_path, path)
        .map_err(|reason| ImportError::VideoDecode {
            path: path.to_path_buf(),
            reason,
        })?;

    let captured_at = match probe_creation_time(&config.ffprobe_path, path) {
        Ok(dt) => dt,
        Err(e) => {
            log_fallback(path, &e);
            fallback_timestamp(path)?
        }
    };

    Ok(MediaMetadata {
        media_type: MediaType::Video,
        width: Some(frame.width()),
        height: Some(frame.height()),
        captured_at,
        orientation: None,
    })
}

fn log_fallback(path: &Path, reason: &MetadataError) {
    debug!("No container date for {} ({}), using file creation time", path.display(), reason);
}

fn fallback_timestamp(path: &Path) -> Result<NaiveDateTime, ImportError> {
    creation_time(path).map_err(|e| ImportError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn music_has_no_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let song = dir.path().join("song.mp3");
        fs::write(&song, b"ID3").unwrap();

        let meta = extract_metadata(&song, &Config::with_media_root(dir.path())).unwrap();
        assert_eq!(meta.media_type, MediaType::Music);
        assert_eq!(meta.width, None);
        assert_eq!(meta.captured_at, creation_time(&song).unwrap());
    }

    #[test]
    fn corrupt_image_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.jpg");
        fs::write(&broken, b"definitely not a jpeg").unwrap();

        let err = extract_metadata(&broken, &Config::with_media_root(dir.path())).unwrap_err();
        assert!(matches!(err, ImportError::Decode { .. }));
    }

    #[test]
    fn video_without_ffmpeg_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let clip = dir.path().join("clip.mp4");
        fs::write(&clip, b"\0\0\0\x18ftypmp42").unwrap();

        let mut config = Config::with_media_root(dir.path());
        config.ffmpeg_path = dir.path().join("no-ffmpeg-here");

        let err = extract_metadata(&clip, &config).unwrap_err();
        assert!(matches!(err, ImportError::VideoDecode { .. }));
    }
}
