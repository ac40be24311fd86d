//! Base schema, created on every open with `IF NOT EXISTS` semantics.
//!
//! The tables here always carry the newest column set; the versioned steps
//! in this module upgrade databases created before a column existed.
//! Indexes on columns added by a later step belong to that step, otherwise
//! opening an old database would fail here.

use rusqlite::Connection;

const SCHEMA_SQL: &str = r#"
-- ----------------------------------------------------------------
-- Students
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS Student (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    name         TEXT NOT NULL,
    className    TEXT,
    tags         TEXT,
    guardianName TEXT,
    phone        TEXT,
    wechat       TEXT,
    whatsapp     TEXT,
    createdAt    INTEGER NOT NULL              -- epoch millis
);

-- ----------------------------------------------------------------
-- Photos (files live under <data>/photos)
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS Photo (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    filePath   TEXT NOT NULL UNIQUE,
    fileName   TEXT,
    capturedAt INTEGER,                        -- epoch millis, nullable
    createdAt  INTEGER NOT NULL,
    sourcePath TEXT                            -- external path of an imported copy
);

-- ----------------------------------------------------------------
-- Student <-> Photo links
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS StudentPhoto (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    studentId INTEGER NOT NULL,
    photoId   INTEGER NOT NULL,
    linkedAt  INTEGER NOT NULL,

    UNIQUE (studentId, photoId),
    FOREIGN KEY (studentId) REFERENCES Student(id) ON DELETE CASCADE,
    FOREIGN KEY (photoId) REFERENCES Photo(id) ON DELETE CASCADE
);

-- ----------------------------------------------------------------
-- Messages sent to a student's guardians
-- ----------------------------------------------------------------
CREATE TABLE IF NOT EXISTS MessageRecord (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    studentId        INTEGER NOT NULL,
    templateText     TEXT NOT NULL,
    personalizedText TEXT,
    finalText        TEXT NOT NULL,
    channel          TEXT,
    createdAt        INTEGER NOT NULL,

    FOREIGN KEY (studentId) REFERENCES Student(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_student_name ON Student(name);
CREATE INDEX IF NOT EXISTS idx_photo_capturedAt ON Photo(capturedAt);
CREATE INDEX IF NOT EXISTS idx_studentphoto_studentId ON StudentPhoto(studentId);
CREATE INDEX IF NOT EXISTS idx_studentphoto_photoId ON StudentPhoto(photoId);
CREATE INDEX IF NOT EXISTS idx_message_studentId ON MessageRecord(studentId);
CREATE INDEX IF NOT EXISTS idx_message_createdAt ON MessageRecord(createdAt);
"#;

pub fn create(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
