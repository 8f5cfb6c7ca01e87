use std::io;
use std::path::Path;
use std::process::{Command, Output};
use chrono::NaiveDateTime;
use image::DynamicImage;
use serde::Deserialize;

use crate::error::MetadataError;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    #[serde(default)]
    tags: ProbeTags,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeTags {
    creation_time: Option<String>,
}

/// Creation date recorded in the container, via ffprobe.
pub fn probe_creation_time(ffprobe: &Path, source_path: &Path) -> Result<NaiveDateTime, MetadataError> {
    let output = Command::new(ffprobe)
        .arg("-v").arg("error")
        .arg("-show_entries").arg("format_tags=creation_time")
        .arg("-of").arg("json")
        .arg(source_path)
        .output();

    let stdout = checked_stdout("ffprobe", output).map_err(MetadataError::Probe)?;
    let probe: ProbeOutput = serde_json::from_slice(&stdout)
        .map_err(|e| MetadataError::Probe(format!("unreadable ffprobe output: {}", e)))?;

    let raw = probe.format.tags.creation_time.ok_or(MetadataError::MissingTimestamp)?;
    parse_creation_date(&raw)
}

/// Accepts `YYYY-MM-DD HH:MM:SS` and ISO-8601 (`2020-05-01T12:00:00.000000Z`).
/// Fractional seconds and zone designators are dropped.
pub fn parse_creation_date(value: &str) -> Result<NaiveDateTime, MetadataError> {
    let normalized = value.trim().replacen('T', " ", 1);
    let head = normalized.get(..19).unwrap_or(normalized.as_str());

    NaiveDateTime::parse_from_str(head, "%Y-%m-%d %H:%M:%S").map_err(|source| {
        MetadataError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Decode the first video frame through ffmpeg. Errors are human-readable reasons.
pub fn decode_first_frame(ffmpeg: &Path, source_path: &Path) -> Result<DynamicImage, String> {
    let output = Command::new(ffmpeg)
        .arg("-v").arg("error")
        .arg("-i").arg(source_path)
        .arg("-frames:v").arg("1")
        .arg("-f").arg("image2pipe")
        .arg("-vcodec").arg("png")
        .arg("-")
        .output();

    let png = checked_stdout("ffmpeg", output)?;
    if png.is_empty() {
        return Err("ffmpeg produced no frame".to_string());
    }

    image::load_from_memory_with_format(&png, image::ImageFormat::Png)
        .map_err(|e| format!("ffmpeg frame is not a valid image: {}", e))
}

fn checked_stdout(program: &str, output: io::Result<Output>) -> Result<Vec<u8>, String> {
    match output {
        Ok(result) if result.status.success() => Ok(result.stdout),
        Ok(result) => {
            let stderr = String::from_utf8_lossy(&result.stderr);
            Err(format!("{} failed: {}", program, stderr.trim()))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(format!("{} not found. Please install ffmpeg to import videos.", program))
        }
        Err(e) => Err(format!("Failed to run {}: {}", program, e)),
    }
}
