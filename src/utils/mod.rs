pub mod exif;
pub mod fs_time;
pub mod video;

pub use self::exif::{parse_exif_datetime, summarize as summarize_exif, ExifSummary};
pub use self::fs_time::creation_time;
pub use self::video::{decode_first_frame, parse_creation_date, probe_creation_time};
