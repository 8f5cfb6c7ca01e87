use std::path::{Path, PathBuf};
use std::fs;
use image::{imageops::FilterType, DynamicImage, ImageError, ImageFormat};
use log::{debug, info};

use crate::config::Config;
use crate::error::ImportError;
use crate::models::{lowercase_suffix, MediaType};
use crate::utils::decode_first_frame;

/// Suffix of every video thumbnail.
pub const VIDEO_THUMBNAIL_SUFFIX: &str = ".jpg";

/// A thumbnail on disk. `width` and `height` are the *source* dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    /// False when the thumbnail was already there and left untouched.
    pub created: bool,
}

#[derive(Debug, Clone)]
pub struct ThumbnailGenerator {
    pub target_height: u32,
    /// Rotate image thumbnails by EXIF orientation. Has no effect on video.
    pub orient_images: bool,
    pub ffmpeg_path: PathBuf,
}

impl ThumbnailGenerator {
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_height: config.thumbnail_height,
            orient_images: config.orient_images,
            ffmpeg_path: config.ffmpeg_path.clone(),
        }
    }

    /// Where the thumbnail of `source` goes in `dest_dir`; `None` for types without one.
    pub fn thumbnail_path(source: &Path, media_type: MediaType, dest_dir: &Path) -> Option<PathBuf> {
        let suffix = match media_type {
            MediaType::Video => VIDEO_THUMBNAIL_SUFFIX.to_string(),
            MediaType::Image => match lowercase_suffix(source)?.as_str() {
                ".jpeg" => ".jpg".to_string(),
                other => other.to_string(),
            },
            MediaType::Music | MediaType::Other => return None,
        };

        let stem = source.file_stem()?.to_str()?;
        Some(dest_dir.join(format!("{}{}", stem, suffix)))
    }

    /// Write the thumbnail of `source` into `dest_dir` unless one is already there.
    ///
    /// `orientation` is the EXIF orientation of an image source; it is only
    /// applied when `orient_images` is set.
    pub fn generate(
        &self,
        source: &Path,
        media_type: MediaType,
        dest_dir: &Path,
        orientation: Option<u32>,
    ) -> Result<Option<Thumbnail>, ImportError> {
        if !media_type.is_visual() {
            return Ok(None);
        }
        let Some(thumbnail_path) = Self::thumbnail_path(source, media_type, dest_dir) else {
            return Ok(None);
        };

        // Check if thumbnail already exists
        if thumbnail_path.exists() {
            debug!("Thumbnail already present: {}", thumbnail_path.display());
            let (width, height) = self.source_dimensions(source, media_type)?;
            return Ok(Some(Thumbnail {
                path: thumbnail_path,
                width,
                height,
                created: false,
            }));
        }

        let img = self.decode_source(source, media_type)?;
        let (width, height) = (img.width(), img.height());

        let img = match (media_type, orientation) {
            (MediaType::Image, Some(orientation)) if self.orient_images => {
                apply_orientation(img, orientation)
            }
            (MediaType::Video, _) => {
                debug!("Video frames are not orientation-corrected: {}", source.display());
                img
            }
            _ => img,
        };

        let thumbnail = resize_to_height(img, self.target_height);
        let thumbnail = DynamicImage::ImageRgb8(thumbnail.to_rgb8());

        fs::create_dir_all(dest_dir).map_err(|e| ImportError::io(dest_dir, e))?;
        write_thumbnail(&thumbnail, &thumbnail_path)?;

        info!(
            "Thumbnail {} ({}x{})",
            thumbnail_path.display(),
            thumbnail.width(),
            thumbnail.height()
        );

        Ok(Some(Thumbnail {
            path: thumbnail_path,
            width,
            height,
            created: true,
        }))
    }

    fn decode_source(&self, source: &Path, media_type: MediaType) -> Result<DynamicImage, ImportError> {
        match media_type {
            MediaType::Video => decode_first_frame(&self.ffmpeg_path, source).map_err(|reason| {
                ImportError::VideoDecode {
                    path: source.to_path_buf(),
                    reason,
                }
            }),
            _ => image::open(source).map_err(|e| decode_error(source, e)),
        }
    }

    fn source_dimensions(&self, source: &Path, media_type: MediaType) -> Result<(u32, u32), ImportError> {
        match media_type {
            MediaType::Video => {
                let frame = self.decode_source(source, media_type)?;
                Ok((frame.width(), frame.height()))
            }
            _ => image::image_dimensions(source).map_err(|e| decode_error(source, e)),
        }
    }
}

/// Scale `img` down to `target_height`, keeping the aspect ratio. Never upscales.
pub fn resize_to_height(img: DynamicImage, target_height: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());
    if target_height == 0 || target_height >= height {
        return img;
    }

    let target_width = (f64::from(target_height) * f64::from(width) / f64::from(height)).round() as u32;
    img.resize_exact(target_width.max(1), target_height, FilterType::Lanczos3)
}

/// Undo the camera rotation for EXIF orientations 3, 6 and 8. Mirrored
/// orientations are left alone.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        3 => img.rotate180(),
        6 => img.rotate90(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Encode `thumbnail` in the format its suffix names.
fn write_thumbnail(thumbnail: &DynamicImage, path: &Path) -> Result<(), ImportError> {
    let format = ImageFormat::from_path(path).map_err(|e| encode_error(path, e))?;
    thumbnail
        .save_with_format(path, format)
        .map_err(|e| encode_error(path, e))
}

fn decode_error(path: &Path, source: ImageError) -> ImportError {
    match source {
        ImageError::IoError(e) => ImportError::io(path, e),
        source => ImportError::Decode {
            path: path.to_path_buf(),
            source,
        },
    }
}

fn encode_error(path: &Path, source: ImageError) -> ImportError {
    match source {
        ImageError::IoError(e) => ImportError::io(path, e),
        source => ImportError::Encode {
            path: path.to_path_buf(),
            source,
        },
    }
}
