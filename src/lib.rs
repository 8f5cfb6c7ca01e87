//! Media ingestion for the hallelujah site: classify files dropped into a user's
//! tree, date them from embedded metadata, give them canonical names, thumbnail
//! them and register them once in a [`db::MediaIndex`].

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod utils;

pub use commands::{ImportOutcome, ImportReport, Importer};
pub use config::Config;
pub use db::{Database, MediaIndex};
pub use error::{ImportError, IndexError};
pub use models::{MediaRecord, MediaType};
