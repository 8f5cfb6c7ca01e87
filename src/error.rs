use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure importing a single file (or, for tree-level variants, a whole tree).
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported or corrupt file {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not write thumbnail {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("could not decode the first frame of {}: {reason}", .path.display())]
    VideoDecode { path: PathBuf, reason: String },

    #[error("{} is not inside the media root of '{owner}'", .path.display())]
    OutsideUserRoot { path: PathBuf, owner: String },

    #[error("filesystem error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("media index failure: {0}")]
    Index(#[from] IndexError),
}

impl ImportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ImportError::Io {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("cannot create database directory: {0}")]
    Io(#[from] io::Error),

    #[error("already registered: {owner}:{relative_path}/{filename}")]
    Duplicate {
        owner: String,
        relative_path: String,
        filename: String,
    },
}

/// Why embedded metadata could not supply a timestamp. Never surfaces past the
/// extractor; every variant leads to the filesystem fallback.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("no readable EXIF block: {0}")]
    Exif(#[from] exif::Error),

    #[error("no date tag present")]
    MissingTimestamp,

    #[error("unparseable timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("container probe failed: {0}")]
    Probe(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
