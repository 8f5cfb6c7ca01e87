pub mod media;

pub use media::{lowercase_suffix, MediaRecord, MediaSuffixes, MediaType};
