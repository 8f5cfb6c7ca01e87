#![cfg(unix)]

mod common;

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use hallelujah_media::{Database, Importer, MediaType};

use common::*;

fn install_stub(path: &Path, body: &str) {
    write_file(path, format!("#!/bin/sh\n{}\n", body).as_bytes());
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn videos_are_dated_renamed_and_thumbnailed_through_ffmpeg() {
    let root = tempfile::tempdir().unwrap();
    let bin = root.path().join("bin");
    let frame = bin.join("frame.png");
    write_png(&frame, 320, 240);

    let mut config = test_config(root.path());
    config.ffmpeg_path = bin.join("ffmpeg");
    config.ffprobe_path = bin.join("ffprobe");
    install_stub(&config.ffmpeg_path, &format!("exec cat '{}'", frame.display()));
    install_stub(
        &config.ffprobe_path,
        r#"printf '%s\n' '{"format":{"tags":{"creation_time":"2020-05-01T12:00:00.000000Z"}}}'"#,
    );

    let user = user_dir(root.path());
    write_file(&user.join("clip.mov"), b"\0\0\0\x14ftypqt  ");
    write_file(&user.join("clip.mp4"), b"\0\0\0\x18ftypmp42");

    let importer = Importer::new(config, Database::open_in_memory().unwrap());
    let report = importer.import_tree(OWNER).unwrap();
    assert!(report.failed.is_empty());

    let names: Vec<&str> = report.imported.iter().map(|r| r.filename.as_str()).collect();
    assert_eq!(names, vec!["VID_20200501_120000.mov", "VID_20200501_120001.mp4"]);
    for record in &report.imported {
        assert_eq!(record.media_type, MediaType::Video);
        assert_eq!((record.width, record.height), (Some(320), Some(240)));
        assert_eq!(record.captured_at, at(2020, 5, 1, 12, 0, 0));
    }

    assert_eq!(
        sorted_names(&user),
        vec!["VID_20200501_120000.mov", "VID_20200501_120001.mp4"]
    );

    let thumbs = thumb_dir(root.path());
    assert_eq!(
        sorted_names(&thumbs),
        vec!["VID_20200501_120000.jpg", "VID_20200501_120001.jpg"]
    );
    assert_eq!(image::image_dimensions(thumbs.join("VID_20200501_120000.jpg")).unwrap(), (267, 200));
}
