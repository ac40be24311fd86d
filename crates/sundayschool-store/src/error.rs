use std::path::PathBuf;

use serde::Serialize;
use sundayschool_shared::constants::ALLOWED_PHOTO_EXTENSIONS;
use sundayschool_shared::TimestampError;
use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Generic I/O error (creating directories, copying files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The handle was closed and has not been initialized again.
    #[error("Database is closed")]
    Closed,

    /// A required field is missing or empty.
    #[error("{0}")]
    Validation(String),

    /// A timestamp argument was rejected.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    /// The targeted row does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// The photo to import does not exist on disk.
    #[error("Source photo file not found: {}", .0.display())]
    SourceMissing(PathBuf),

    #[error(
        "Invalid file type {extension:?}. Allowed types: {}",
        ALLOWED_PHOTO_EXTENSIONS.join(", ")
    )]
    UnsupportedFileType { extension: String },

    #[error("Invalid MIME type. Detected: {mime}")]
    UnsupportedMimeType { mime: String },

    #[error("File size {size} bytes exceeds maximum allowed size of {max} bytes")]
    FileTooLarge { size: u64, max: u64 },

    /// Copying the photo into managed storage failed.
    #[error("Failed to import photo: {0}")]
    ImportFailed(String),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Coarse classification of a [`StoreError`], surfaced to callers next to
/// the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Validation,
    NotFound,
    File,
    Infrastructure,
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) | StoreError::Timestamp(_) => ErrorKind::Validation,
            StoreError::NotFound { .. } => ErrorKind::NotFound,
            StoreError::SourceMissing(_)
            | StoreError::UnsupportedFileType { .. }
            | StoreError::UnsupportedMimeType { .. }
            | StoreError::FileTooLarge { .. }
            | StoreError::ImportFailed(_) => ErrorKind::File,
            StoreError::Sqlite(_)
            | StoreError::Io(_)
            | StoreError::Closed
            | StoreError::Migration(_) => ErrorKind::Infrastructure,
        }
    }

    pub(crate) fn not_found(entity: &'static str) -> Self {
        StoreError::NotFound { entity }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
