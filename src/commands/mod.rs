pub mod metadata;
pub mod naming;
pub mod thumbnail;
pub mod import;

pub use metadata::{extract_metadata, MediaMetadata};
pub use naming::{canonical_filename, format_canonical, normalize_filename, rename_in_place};
pub use thumbnail::{Thumbnail, ThumbnailGenerator};
pub use import::{ImportFailure, ImportOutcome, ImportReport, Importer};
