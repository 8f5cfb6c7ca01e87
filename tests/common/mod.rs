#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use hallelujah_media::{Config, Database, Importer};

pub const OWNER: &str = "alice";

pub fn ascii(tag: Tag, value: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![value.as_bytes().to_vec()]),
    }
}

pub fn orientation(value: u16) -> Field {
    Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![value]),
    }
}

pub fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

fn tiff_block(fields: &[Field]) -> Vec<u8> {
    let make = ascii(Tag::Make, "hallelujah");
    let mut writer = Writer::new();
    writer.push_field(&make);
    for field in fields {
        writer.push_field(field);
    }
    let mut out = Cursor::new(Vec::new());
    writer.write(&mut out, false).unwrap();
    out.into_inner()
}

/// A JPEG with an APP1 EXIF segment carrying `fields` (none when empty).
pub fn write_jpeg(path: &Path, width: u32, height: u32, fields: &[Field]) {
    let jpeg = encode(&gradient(width, height), ImageFormat::Jpeg);
    let bytes = if fields.is_empty() {
        jpeg
    } else {
        let tiff = tiff_block(fields);
        let segment_len = u16::try_from(2 + 6 + tiff.len()).unwrap();

        let mut spliced = Vec::with_capacity(jpeg.len() + tiff.len() + 10);
        spliced.extend_from_slice(&jpeg[..2]);
        spliced.extend_from_slice(&[0xFF, 0xE1]);
        spliced.extend_from_slice(&segment_len.to_be_bytes());
        spliced.extend_from_slice(b"Exif\0\0");
        spliced.extend_from_slice(&tiff);
        spliced.extend_from_slice(&jpeg[2..]);
        spliced
    };

    write_file(path, &bytes);
}

pub fn write_png(path: &Path, width: u32, height: u32) {
    write_file(path, &encode(&gradient(width, height), ImageFormat::Png));
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

pub fn test_config(media_root: &Path) -> Config {
    let mut config = Config::with_media_root(media_root);
    config.ffmpeg_path = media_root.join("missing-ffmpeg");
    config.ffprobe_path = media_root.join("missing-ffprobe");
    config
}

pub fn importer(media_root: &Path) -> Importer<Database> {
    Importer::new(test_config(media_root), Database::open_in_memory().unwrap())
}

pub fn user_dir(media_root: &Path) -> PathBuf {
    media_root.join("original").join(OWNER)
}

pub fn thumb_dir(media_root: &Path) -> PathBuf {
    media_root.join("thumbnail").join(OWNER)
}

pub fn sorted_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
