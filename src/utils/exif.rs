use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use chrono::NaiveDateTime;

use crate::error::MetadataError;

/// Date tags in the order they are trusted.
const DATE_TAGS: [exif::Tag; 3] = [
    exif::Tag::DateTimeOriginal,
    exif::Tag::DateTimeDigitized,
    exif::Tag::DateTime,
];

/// What the importer needs from an EXIF block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifSummary {
    pub date_taken: Option<NaiveDateTime>,
    pub orientation: Option<u32>,
}

pub fn read_exif(path: &Path) -> Result<exif::Exif, MetadataError> {
    let file = File::open(path)?;
    let mut bufreader = BufReader::new(&file);
    let exif = exif::Reader::new().read_from_container(&mut bufreader)?;
    Ok(exif)
}

/// Read date and orientation in one pass. A missing or broken EXIF block is an
/// error; a block without usable dates is not.
pub fn summarize(path: &Path) -> Result<ExifSummary, MetadataError> {
    let exif = read_exif(path)?;
    Ok(ExifSummary {
        date_taken: extract_date_taken(&exif).ok(),
        orientation: extract_orientation(&exif),
    })
}

/// First parseable of DateTimeOriginal, DateTimeDigitized, DateTime.
pub fn extract_date_taken(exif: &exif::Exif) -> Result<NaiveDateTime, MetadataError> {
    let mut last_error = MetadataError::MissingTimestamp;

    for tag in DATE_TAGS {
        let Some(field) = exif.get_field(tag, exif::In::PRIMARY) else {
            continue;
        };
        let Some(raw) = ascii_value(&field.value) else {
            continue;
        };
        match parse_exif_datetime(&raw) {
            Ok(dt) => return Ok(dt),
            Err(e) => {
                log::debug!("ignoring {}: {}", tag, e);
                last_error = e;
            }
        }
    }

    Err(last_error)
}

pub fn extract_orientation(exif: &exif::Exif) -> Option<u32> {
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

fn ascii_value(value: &exif::Value) -> Option<String> {
    match value {
        exif::Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Parse `YYYY:MM:DD HH:MM:SS`, discarding any `+hh:mm` offset.
pub fn parse_exif_datetime(value: &str) -> Result<NaiveDateTime, MetadataError> {
    let local = value.split('+').next().unwrap_or_default();
    let local = local.trim_matches(|c: char| c.is_whitespace() || c == '\0');

    NaiveDateTime::parse_from_str(local, "%Y:%m:%d %H:%M:%S").map_err(|source| {
        MetadataError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}
