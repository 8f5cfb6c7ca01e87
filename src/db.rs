use rusqlite::{Connection, ErrorCode, OptionalExtension, Result as SqlResult, Row};
use std::path::Path;
use chrono::NaiveDateTime;

use crate::error::IndexError;
use crate::models::{MediaRecord, MediaType};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Catalog of imported media, keyed by `(owner, relative_path, filename)`.
///
/// The importer only asks whether a key is taken and registers new records;
/// editing and deleting records (and their thumbnails) is up to the implementor.
pub trait MediaIndex {
    fn exists(&self, owner: &str, relative_path: &str, filename: &str) -> Result<bool, IndexError>;

    /// Store `record` and return it as stored, with its id filled in.
    fn register(&self, record: MediaRecord) -> Result<MediaRecord, IndexError>;
}

impl<T: MediaIndex + ?Sized> MediaIndex for &T {
    fn exists(&self, owner: &str, relative_path: &str, filename: &str) -> Result<bool, IndexError> {
        (**self).exists(owner, relative_path, filename)
    }

    fn register(&self, record: MediaRecord) -> Result<MediaRecord, IndexError> {
        (**self).register(record)
    }
}

/// SQLite-backed [`MediaIndex`].
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self, IndexError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        let db = Database { conn };
        db.init_schema()?;

        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self, IndexError> {
        let db = Database { conn: Connection::open_in_memory()? };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> SqlResult<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS medias (
                id INTEGER PRIMARY KEY,
                owner TEXT NOT NULL,
                relative_path TEXT NOT NULL,
                filename TEXT NOT NULL,
                width INTEGER,
                height INTEGER,
                captured_at TEXT NOT NULL,
                media_type INTEGER NOT NULL,
                is_public INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(owner, relative_path, filename)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_medias_captured
             ON medias(owner, captured_at)",
            [],
        )?;

        Ok(())
    }

    // All records of an owner, newest capture first
    pub fn list_media(&self, owner: &str) -> Result<Vec<MediaRecord>, IndexError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, relative_path, filename, width, height,
                    captured_at, media_type, is_public
             FROM medias
             WHERE owner = ?1
             ORDER BY captured_at DESC, filename DESC"
        )?;

        let records = stmt
            .query_map([owner], record_from_row)?
            .collect::<SqlResult<Vec<MediaRecord>>>()?;

        Ok(records)
    }

    pub fn count_media(&self, owner: &str) -> Result<i64, IndexError> {
        let mut stmt = self.conn.prepare("SELECT COUNT(*) FROM medias WHERE owner = ?1")?;
        let count = stmt.query_row([owner], |row| row.get(0))?;
        Ok(count)
    }
}

impl MediaIndex for Database {
    fn exists(&self, owner: &str, relative_path: &str, filename: &str) -> Result<bool, IndexError> {
        let mut stmt = self.conn.prepare(
            "SELECT id FROM medias WHERE owner = ?1 AND relative_path = ?2 AND filename = ?3"
        )?;

        let found: Option<i64> = stmt
            .query_row([owner, relative_path, filename], |row| row.get(0))
            .optional()?;

        Ok(found.is_some())
    }

    fn register(&self, record: MediaRecord) -> Result<MediaRecord, IndexError> {
        let inserted = self.conn.execute(
            "INSERT INTO medias
             (owner, relative_path, filename, width, height, captured_at, media_type, is_public)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                record.owner,
                record.relative_path,
                record.filename,
                record.width,
                record.height,
                record.captured_at.format(TIMESTAMP_FORMAT).to_string(),
                record.media_type.code(),
                record.is_public,
            ],
        );

        match inserted {
            Ok(_) => Ok(MediaRecord {
                id: Some(self.conn.last_insert_rowid()),
                ..record
            }),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(IndexError::Duplicate {
                    owner: record.owner,
                    relative_path: record.relative_path,
                    filename: record.filename,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn record_from_row(row: &Row<'_>) -> SqlResult<MediaRecord> {
    let captured_at: String = row.get(6)?;
    let captured_at = NaiveDateTime::parse_from_str(&captured_at, TIMESTAMP_FORMAT)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?;

    let code: u8 = row.get(7)?;
    let media_type = MediaType::from_code(code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            rusqlite::types::Type::Integer,
            format!("unknown media type code {}", code).into(),
        )
    })?;

    Ok(MediaRecord {
        id: Some(row.get(0)?),
        owner: row.get(1)?,
        relative_path: row.get(2)?,
        filename: row.get(3)?,
        width: row.get(4)?,
        height: row.get(5)?,
        captured_at,
        media_type,
        is_public: row.get(8)?,
    })
}
