//! Student <-> Photo links.
//!
//! The pair `(studentId, photoId)` is unique; linking twice is a no-op.
//! Deleting either side removes its links through ON DELETE CASCADE.

use rusqlite::params;
use rusqlite::types::Value;
use sundayschool_shared::now_millis;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{Photo, Student};
use crate::query::qualified;
use crate::{photos, students};

impl Database {
    /// Link a student to a photo.  Returns 1 when a link was created and 0
    /// when it already existed.
    pub fn link_student_photo(&self, student_id: i64, photo_id: i64) -> Result<usize> {
        if !self.row_exists("Student", student_id)? {
            return Err(StoreError::not_found("Student"));
        }
        if !self.row_exists("Photo", photo_id)? {
            return Err(StoreError::not_found("Photo"));
        }

        let affected = self.conn()?.execute(
            "INSERT OR IGNORE INTO StudentPhoto (studentId, photoId, linkedAt)
             VALUES (?1, ?2, ?3)",
            params![student_id, photo_id, now_millis()],
        )?;
        Ok(affected)
    }

    /// Remove a link.  Returns 0 when there was nothing to remove.
    pub fn unlink_student_photo(&self, student_id: i64, photo_id: i64) -> Result<usize> {
        let affected = self.conn()?.execute(
            "DELETE FROM StudentPhoto WHERE studentId = ?1 AND photoId = ?2",
            params![student_id, photo_id],
        )?;
        Ok(affected)
    }

    /// Photos linked to a student, most recently linked first.
    pub fn list_photos_for_student(&self, student_id: i64) -> Result<Vec<Photo>> {
        let sql = format!(
            "SELECT {} FROM Photo
             JOIN StudentPhoto ON StudentPhoto.photoId = Photo.id
             WHERE StudentPhoto.studentId = ?1
             ORDER BY StudentPhoto.linkedAt DESC, StudentPhoto.id DESC",
            qualified(photos::COLUMNS, "Photo")
        );
        self.query_photos(&sql, vec![Value::Integer(student_id)])
    }

    /// Students linked to a photo, most recently linked first.
    pub fn list_students_for_photo(&self, photo_id: i64) -> Result<Vec<Student>> {
        let sql = format!(
            "SELECT {} FROM Student
             JOIN StudentPhoto ON StudentPhoto.studentId = Student.id
             WHERE StudentPhoto.photoId = ?1
             ORDER BY StudentPhoto.linkedAt DESC, StudentPhoto.id DESC",
            qualified(students::COLUMNS, "Student")
        );
        self.query_students(&sql, vec![Value::Integer(photo_id)])
    }
}
