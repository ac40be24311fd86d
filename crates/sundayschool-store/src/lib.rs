//! # sundayschool-store
//!
//! Local storage for Sunday School Time, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle that owns the single
//! connection of the process, the managed photo directory and the backup
//! directory, and provides typed operations for students, photos, the links
//! between them, and message records.

pub mod backup;
pub mod config;
pub mod database;
pub mod envelope;
pub mod links;
pub mod message_records;
pub mod migrations;
pub mod models;
pub mod photos;
pub mod students;

mod error;
mod import;
mod query;

pub use backup::BackupFile;
pub use config::{StoragePaths, StoreConfig};
pub use database::{Database, Inventory};
pub use envelope::Envelope;
pub use error::{ErrorKind, Result, StoreError};
pub use models::*;
