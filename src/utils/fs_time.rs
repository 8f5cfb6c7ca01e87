use std::fs::{self, Metadata};
use std::io;
use std::path::Path;
use std::time::SystemTime;
use chrono::{DateTime, Local, NaiveDateTime, Timelike};

/// Creation time of `path` in local time, to the second. Uses the birth time where
/// the platform records one, else the last metadata change.
pub fn creation_time(path: &Path) -> io::Result<NaiveDateTime> {
    let metadata = fs::metadata(path)?;
    let time = match metadata.created() {
        Ok(t) => t,
        Err(_) => changed_time(&metadata)?,
    };

    let local = DateTime::<Local>::from(time).naive_local();
    Ok(local.with_nanosecond(0).unwrap_or(local))
}

#[cfg(unix)]
fn changed_time(metadata: &Metadata) -> io::Result<SystemTime> {
    use std::os::unix::fs::MetadataExt;
    use std::time::{Duration, UNIX_EPOCH};

    let secs = u64::try_from(metadata.ctime())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "ctime before epoch"))?;
    Ok(UNIX_EPOCH + Duration::from_secs(secs))
}

#[cfg(not(unix))]
fn changed_time(metadata: &Metadata) -> io::Result<SystemTime> {
    metadata.modified()
}
