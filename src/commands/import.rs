use std::path::{Component, Path, PathBuf};
use std::fs;
use std::io;
use log::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

use crate::commands::metadata::extract_metadata;
use crate::commands::naming::normalize_filename;
use crate::commands::thumbnail::ThumbnailGenerator;
use crate::config::Config;
use crate::db::MediaIndex;
use crate::error::ImportError;
use crate::models::MediaRecord;

#[derive(Debug)]
pub enum ImportOutcome {
    Imported(MediaRecord),
    /// The file's current name is already registered; nothing was touched.
    AlreadyImported(PathBuf),
}

#[derive(Debug)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub error: ImportError,
}

/// Result of walking one owner's tree.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<MediaRecord>,
    pub already_imported: Vec<PathBuf>,
    pub failed: Vec<ImportFailure>,
}

/// Drives extraction, renaming, thumbnailing and registration.
///
/// Imports for one owner must not run concurrently: the duplicate check and the
/// registration are separate index calls.
pub struct Importer<I> {
    config: Config,
    index: I,
    thumbnails: ThumbnailGenerator,
}

impl<I: MediaIndex> Importer<I> {
    pub fn new(config: Config, index: I) -> Self {
        let thumbnails = ThumbnailGenerator::from_config(&config);
        Self {
            config,
            index,
            thumbnails,
        }
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Import one file that already sits somewhere under the owner's originals root.
    pub fn import_file(
        &self,
        path: &Path,
        owner: &str,
        is_public: bool,
    ) -> Result<ImportOutcome, ImportError> {
        if !path.is_file() {
            return Err(ImportError::io(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }

        let user_root = self.config.user_original_root(owner);
        let relative_dir = path
            .parent()
            .and_then(|parent| parent.strip_prefix(&user_root).ok())
            .ok_or_else(|| ImportError::OutsideUserRoot {
                path: path.to_path_buf(),
                owner: owner.to_string(),
            })?
            .to_path_buf();
        let relative_path = index_key_path(&relative_dir);

        let path = lowercase_extension(path)?;
        let current_name = file_name_of(&path);
        if self.index.exists(owner, &relative_path, &current_name)? {
            info!("Already imported: {}", path.display());
            return Ok(ImportOutcome::AlreadyImported(path));
        }

        let metadata = extract_metadata(&path, &self.config)?;
        let thumbnail_dir = self.config.user_thumbnail_root(owner).join(&relative_dir);

        let path = normalize_filename(
            &path,
            metadata.media_type,
            metadata.captured_at,
            owner,
            &relative_path,
            &thumbnail_dir,
            &self.index,
        )?;

        self.thumbnails
            .generate(&path, metadata.media_type, &thumbnail_dir, metadata.orientation)?;

        let record = MediaRecord {
            id: None,
            owner: owner.to_string(),
            relative_path,
            filename: file_name_of(&path),
            width: metadata.width,
            height: metadata.height,
            captured_at: metadata.captured_at,
            media_type: metadata.media_type,
            is_public,
        };
        let record = self.index.register(record)?;

        info!("Imported {} as {:?}", path.display(), record.media_type);
        Ok(ImportOutcome::Imported(record))
    }

    /// Import every regular file under the owner's originals root as private media.
    ///
    /// Per-file failures are collected in the report. Only failing to set up or
    /// read the owner's roots aborts the walk.
    pub fn import_tree(&self, owner: &str) -> Result<ImportReport, ImportError> {
        let user_root = self.config.user_original_root(owner);
        let mut report = ImportReport::default();

        if !user_root.exists() {
            fs::create_dir_all(&user_root).map_err(|e| ImportError::io(&user_root, e))?;
            info!("Created media root {}, nothing to import", user_root.display());
            return Ok(report);
        }

        let thumbnail_root = self.config.user_thumbnail_root(owner);
        fs::create_dir_all(&thumbnail_root).map_err(|e| {
            error!("Cannot create thumbnail root {}: {}", thumbnail_root.display(), e);
            ImportError::io(&thumbnail_root, e)
        })?;

        info!("Scanning media root: {}", user_root.display());

        // Collect before renaming anything so the walk never sees a file twice
        let entries: Vec<walkdir::Result<DirEntry>> = WalkDir::new(&user_root)
            .follow_links(false)
            .contents_first(true)
            .sort_by_file_name()
            .into_iter()
            .collect();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    error!("Cannot read media root {}: {}", user_root.display(), e);
                    return Err(e.into());
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| user_root.clone());
                    warn!("Skipping {}: {}", path.display(), e);
                    report.failed.push(ImportFailure { path, error: e.into() });
                    continue;
                }
            };

            if !entry.file_type().is_file() || self.is_excluded(entry.path(), &user_root) {
                continue;
            }

            match self.import_file(entry.path(), owner, false) {
                Ok(ImportOutcome::Imported(record)) => report.imported.push(record),
                Ok(ImportOutcome::AlreadyImported(path)) => report.already_imported.push(path),
                Err(error) => {
                    warn!("Failed to import {}: {}", entry.path().display(), error);
                    report.failed.push(ImportFailure {
                        path: entry.path().to_path_buf(),
                        error,
                    });
                }
            }
        }

        info!(
            "Imported {} files for {} ({} already present, {} failed)",
            report.imported.len(),
            owner,
            report.already_imported.len(),
            report.failed.len()
        );

        Ok(report)
    }

    /// Whether `path` sits below one of the excluded directory names.
    fn is_excluded(&self, path: &Path, user_root: &Path) -> bool {
        let Some(relative_dir) = path.strip_prefix(user_root).ok().and_then(Path::parent) else {
            return false;
        };

        relative_dir.components().any(|c| match c {
            Component::Normal(name) => self.config.excluded_dirs.iter().any(|d| name == d.as_str()),
            _ => false,
        })
    }
}

/// `a/b` style key for a directory relative to the owner's root; empty for the root.
fn index_key_path(relative_dir: &Path) -> String {
    relative_dir
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Rename `path` so its extension is lower-case. Refuses to replace another file.
pub fn lowercase_extension(path: &Path) -> Result<PathBuf, ImportError> {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return Ok(path.to_path_buf());
    };

    let lower = ext.to_lowercase();
    if lower == ext {
        return Ok(path.to_path_buf());
    }

    let target = path.with_extension(&lower);
    if target.exists() && !same_file(path, &target) {
        return Err(ImportError::io(
            &target,
            io::Error::new(io::ErrorKind::AlreadyExists, "refusing to overwrite"),
        ));
    }

    fs::rename(path, &target).map_err(|e| ImportError::io(path, e))?;
    Ok(target)
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(a), fs::metadata(b)) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
