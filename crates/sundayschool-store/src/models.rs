//! Domain model structs persisted in the local SQLite database.
//!
//! Every row struct derives `Serialize` with camelCase field names so it can
//! be handed directly to the UI layer over IPC.  All timestamps are epoch
//! milliseconds.

use std::path::PathBuf;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Student
// ---------------------------------------------------------------------------

/// A student and their guardian's contact details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    /// Never empty.
    pub name: String,
    pub class_name: String,
    /// Free-form tags, as entered in the roster.
    pub tags: String,
    pub guardian_name: String,
    pub phone: String,
    pub wechat: String,
    pub whatsapp: String,
    pub created_at: i64,
}

/// Fields for [`crate::Database::add_student`].  Only `name` is required.
#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub name: String,
    pub class_name: String,
    pub tags: String,
    pub guardian_name: String,
    pub phone: String,
    pub wechat: String,
    pub whatsapp: String,
}

impl NewStudent {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct StudentUpdate {
    pub name: Option<String>,
    pub class_name: Option<String>,
    pub tags: Option<String>,
    pub guardian_name: Option<String>,
    pub phone: Option<String>,
    pub wechat: Option<String>,
    pub whatsapp: Option<String>,
}

// ---------------------------------------------------------------------------
// Photo
// ---------------------------------------------------------------------------

/// A photo file in managed storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    /// Absolute path, unique across photos.
    pub file_path: String,
    pub file_name: String,
    pub captured_at: Option<i64>,
    pub created_at: i64,
}

/// Import request for [`crate::Database::add_photo`].
#[derive(Debug, Clone, Default)]
pub struct NewPhoto {
    pub file_path: PathBuf,
    /// Display name; defaults to the source file's name.
    pub file_name: Option<String>,
    /// Seconds or milliseconds since the epoch.
    pub captured_at: Option<f64>,
}

impl NewPhoto {
    pub fn from_path(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Self::default()
        }
    }
}

/// Partial update; `None` keeps the stored value.
#[derive(Debug, Clone, Default)]
pub struct PhotoUpdate {
    pub file_name: Option<String>,
    pub captured_at: Option<f64>,
}

// ---------------------------------------------------------------------------
// MessageRecord
// ---------------------------------------------------------------------------

/// A message composed for a student's guardian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: i64,
    pub student_id: i64,
    pub template_text: String,
    pub personalized_text: String,
    pub final_text: String,
    /// Delivery channel, e.g. `wechat` or `whatsapp`.
    pub channel: String,
    pub created_at: i64,
}

#[derive(Debug, Clone, Default)]
pub struct NewMessageRecord {
    pub student_id: i64,
    pub template_text: String,
    pub personalized_text: String,
    pub final_text: String,
    pub channel: String,
}

/// Filters for [`crate::Database::list_message_records`], combined with AND.
/// `from` and `to` bound `createdAt` inclusively.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageFilter {
    pub student_id: Option<i64>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}

// ---------------------------------------------------------------------------
// Paging
// ---------------------------------------------------------------------------

/// `limit` applies only when it is positive; otherwise every row is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub limit: Option<i64>,
    pub offset: i64,
}

impl ListOptions {
    pub fn page(limit: i64, offset: i64) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }
}
