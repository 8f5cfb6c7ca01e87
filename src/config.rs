use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::Result;

use crate::models::MediaSuffixes;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the originals tree; each owner gets `<original_root>/<owner>`.
    pub original_root: PathBuf,
    /// Root of the thumbnail tree, mirroring `original_root`.
    pub thumbnail_root: PathBuf,
    pub database_path: PathBuf,
    pub thumbnail_height: u32,
    /// Rotate image thumbnails by their EXIF orientation tag. Video frames are never rotated.
    pub orient_images: bool,
    /// Directory names the tree walk does not descend into.
    pub excluded_dirs: Vec<String>,
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub suffixes: MediaSuffixes,
}

const DEFAULT_THUMBNAIL_HEIGHT: u32 = 200;
const DEFAULT_EXCLUDED_DIRS: [&str; 2] = ["public", "private"];

impl Default for Config {
    fn default() -> Self {
        let media_root = get_default_media_root()
            .unwrap_or_else(|_| PathBuf::from("data").join("media"));

        Self {
            original_root: media_root.join("original"),
            thumbnail_root: media_root.join("thumbnail"),
            database_path: media_root.join("media.db"),
            thumbnail_height: DEFAULT_THUMBNAIL_HEIGHT,
            orient_images: false,
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            suffixes: MediaSuffixes::default(),
        }
    }
}

impl Config {
    /// Config rooted at `media_root`, everything else default.
    pub fn with_media_root(media_root: &Path) -> Self {
        Self {
            original_root: media_root.join("original"),
            thumbnail_root: media_root.join("thumbnail"),
            database_path: media_root.join("media.db"),
            ..Self::default()
        }
    }

    /// Load config from `path`, writing the defaults there first if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Write the defaults to `path`. An existing file is only replaced when `force` is set.
    pub fn write_default(path: &Path, force: bool) -> Result<Self> {
        if path.exists() && !force {
            anyhow::bail!("refusing to overwrite existing config {}", path.display());
        }

        let config = Config::default();
        config.save_to(path)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;

        Ok(())
    }

    pub fn user_original_root(&self, owner: &str) -> PathBuf {
        self.original_root.join(owner)
    }

    pub fn user_thumbnail_root(&self, owner: &str) -> PathBuf {
        self.thumbnail_root.join(owner)
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?;
    Ok(home.join(".hallelujah").join("config.toml"))
}

pub fn get_default_media_root() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?;
    Ok(home.join("data").join("media"))
}
