use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A registered media file. `id` is assigned by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub id: Option<i64>,
    pub owner: String,
    pub relative_path: String,
    pub filename: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub captured_at: NaiveDateTime,
    pub media_type: MediaType,
    pub is_public: bool,
}

impl MediaRecord {
    /// Path of the original relative to the originals root.
    pub fn original_relpath(&self) -> String {
        join_rel(&[&self.owner, &self.relative_path, &self.filename])
    }
}

fn join_rel(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/")
}

/// Ordered so that `>= MediaType::Image` selects the types that get thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum MediaType {
    Other = 0,
    Music = 1,
    Image = 2,
    Video = 3,
}

impl MediaType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(MediaType::Other),
            1 => Some(MediaType::Music),
            2 => Some(MediaType::Image),
            3 => Some(MediaType::Video),
            _ => None,
        }
    }

    pub fn is_visual(self) -> bool {
        self >= MediaType::Image
    }

    /// Prefix of canonical filenames, for the types that get renamed.
    pub fn canonical_prefix(self) -> Option<&'static str> {
        match self {
            MediaType::Image => Some("IMG"),
            MediaType::Video => Some("VID"),
            MediaType::Other | MediaType::Music => None,
        }
    }
}

/// Recognized suffixes per media type, each including the leading dot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSuffixes {
    pub image: Vec<String>,
    pub video: Vec<String>,
    pub music: Vec<String>,
}

impl Default for MediaSuffixes {
    fn default() -> Self {
        fn owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            image: owned(IMAGE_SUFFIXES),
            video: owned(VIDEO_SUFFIXES),
            music: owned(MUSIC_SUFFIXES),
        }
    }
}

pub const IMAGE_SUFFIXES: &[&str] = &[".jpg", ".jpeg", ".png", ".gif"];
pub const VIDEO_SUFFIXES: &[&str] = &[".mp4", ".mov", ".m4v"];
pub const MUSIC_SUFFIXES: &[&str] = &[".mp3", ".wav"];

impl MediaSuffixes {
    pub fn classify(&self, path: &Path) -> MediaType {
        let Some(suffix) = lowercase_suffix(path) else {
            return MediaType::Other;
        };

        if contains(&self.image, &suffix) {
            MediaType::Image
        } else if contains(&self.video, &suffix) {
            MediaType::Video
        } else if contains(&self.music, &suffix) {
            MediaType::Music
        } else {
            MediaType::Other
        }
    }
}

fn contains(set: &[String], suffix: &str) -> bool {
    set.iter().any(|s| s.eq_ignore_ascii_case(suffix))
}

/// The extension of `path` with its leading dot, lower-cased.
pub fn lowercase_suffix(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    Some(format!(".{}", ext.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_suffix_ignoring_case() {
        let suffixes = MediaSuffixes::default();
        assert_eq!(suffixes.classify(Path::new("a/b.JPG")), MediaType::Image);
        assert_eq!(suffixes.classify(Path::new("clip.mov")), MediaType::Video);
        assert_eq!(suffixes.classify(Path::new("song.Mp3")), MediaType::Music);
        assert_eq!(suffixes.classify(Path::new("notes.txt")), MediaType::Other);
        assert_eq!(suffixes.classify(Path::new("README")), MediaType::Other);
    }

    #[test]
    fn visual_types_sort_above_music() {
        assert!(MediaType::Video.is_visual());
        assert!(MediaType::Image.is_visual());
        assert!(!MediaType::Music.is_visual());
        assert!(MediaType::Music > MediaType::Other);
        assert_eq!(MediaType::from_code(MediaType::Video.code()), Some(MediaType::Video));
        assert_eq!(MediaType::from_code(9), None);
    }

    #[test]
    fn relpath_skips_empty_directory() {
        let record = MediaRecord {
            id: None,
            owner: "alice".into(),
            relative_path: String::new(),
            filename: "IMG_20200501_120000.jpg".into(),
            width: Some(4),
            height: Some(3),
            captured_at: chrono::NaiveDate::from_ymd_opt(2020, 5, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            media_type: MediaType::Image,
            is_public: false,
        };
        assert_eq!(record.original_relpath(), "alice/IMG_20200501_120000.jpg");
    }
}
