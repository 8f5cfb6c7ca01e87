use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use chrono::{Duration, NaiveDateTime};
use log::info;

use crate::commands::thumbnail::ThumbnailGenerator;
use crate::db::MediaIndex;
use crate::error::{ImportError, IndexError};
use crate::models::{lowercase_suffix, MediaType};

/// `IMG_20200501_120000.jpg` and friends.
pub fn format_canonical(prefix: &str, captured_at: NaiveDateTime, suffix: &str) -> String {
    format!("{}_{}{}", prefix, captured_at.format("%Y%m%d_%H%M%S"), suffix)
}

/// Pick the canonical name for `original`, or `None` for types that keep their name.
///
/// Starting at `captured_at`, each candidate that is already registered for
/// `(owner, relative_path)`, taken on disk by another file, or whose thumbnail
/// already sits in `thumbnail_dir` pushes the timestamp one second forward.
/// Suffixes that share a thumbnail name (`.jpeg`/`.jpg`, all videos) therefore
/// never share a timestamp.
pub fn canonical_filename(
    original: &Path,
    media_type: MediaType,
    captured_at: NaiveDateTime,
    owner: &str,
    relative_path: &str,
    thumbnail_dir: &Path,
    index: &dyn MediaIndex,
) -> Result<Option<String>, IndexError> {
    let Some(prefix) = media_type.canonical_prefix() else {
        return Ok(None);
    };

    let suffix = lowercase_suffix(original).unwrap_or_default();
    let current = original.file_name().and_then(|n| n.to_str());
    let dir = original.parent().unwrap_or_else(|| Path::new(""));

    let mut stamp = captured_at;
    loop {
        let candidate = format_canonical(prefix, stamp, &suffix);

        let taken = index.exists(owner, relative_path, &candidate)?
            || (current != Some(candidate.as_str()) && dir.join(&candidate).exists())
            || ThumbnailGenerator::thumbnail_path(Path::new(&candidate), media_type, thumbnail_dir)
                .is_some_and(|thumbnail| thumbnail.exists());
        if !taken {
            return Ok(Some(candidate));
        }

        stamp += Duration::seconds(1);
    }
}

/// Rename `original` in its directory to `filename`, refusing to overwrite.
pub fn rename_in_place(original: &Path, filename: &str) -> Result<PathBuf, ImportError> {
    if original.file_name().and_then(|n| n.to_str()) == Some(filename) {
        return Ok(original.to_path_buf());
    }

    let target = original.with_file_name(filename);
    if target.exists() {
        return Err(ImportError::io(
            &target,
            io::Error::new(io::ErrorKind::AlreadyExists, "refusing to overwrite"),
        ));
    }

    fs::rename(original, &target).map_err(|e| ImportError::io(original, e))?;
    info!("Renamed {} -> {}", original.display(), target.display());
    Ok(target)
}

/// Give `original` its canonical name on disk and return where it now lives.
pub fn normalize_filename(
    original: &Path,
    media_type: MediaType,
    captured_at: NaiveDateTime,
    owner: &str,
    relative_path: &str,
    thumbnail_dir: &Path,
    index: &dyn MediaIndex,
) -> Result<PathBuf, ImportError> {
    match canonical_filename(original, media_type, captured_at, owner, relative_path, thumbnail_dir, index)? {
        Some(filename) => rename_in_place(original, &filename),
        None => Ok(original.to_path_buf()),
    }
}
