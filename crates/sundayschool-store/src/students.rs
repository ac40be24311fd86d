//! CRUD operations for [`Student`] records.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use sundayschool_shared::now_millis;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{ListOptions, NewStudent, Student, StudentUpdate};
use crate::query::{like_any, like_pattern, paginate};

pub(crate) const COLUMNS: &str =
    "id, name, className, tags, guardianName, phone, wechat, whatsapp, createdAt";

const SEARCHABLE: [&str; 7] = [
    "name",
    "className",
    "tags",
    "guardianName",
    "phone",
    "wechat",
    "whatsapp",
];

const ORDER: &str = "ORDER BY createdAt DESC, id DESC";

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Insert a new student and return its id.  The name is trimmed and must
    /// not be empty.
    pub fn add_student(&self, student: &NewStudent) -> Result<i64> {
        let name = required_name(&student.name)?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO Student (name, className, tags, guardianName, phone, wechat, whatsapp, createdAt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                name,
                student.class_name,
                student.tags,
                student.guardian_name,
                student.phone,
                student.wechat,
                student.whatsapp,
                now_millis(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!(id, "student added");
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List students, newest first.
    pub fn list_students(&self, options: ListOptions) -> Result<Vec<Student>> {
        let mut sql = format!("SELECT {COLUMNS} FROM Student {ORDER}");
        let mut params = Vec::new();
        paginate(&mut sql, &mut params, options);
        self.query_students(&sql, params)
    }

    pub fn count_students(&self) -> Result<i64> {
        Ok(self
            .conn()?
            .query_row("SELECT COUNT(*) FROM Student", [], |row| row.get(0))?)
    }

    /// Case-insensitive substring search over the name, class, tags and
    /// contact fields.  A blank query lists every student.
    pub fn search_students(&self, query: &str, options: ListOptions) -> Result<Vec<Student>> {
        let term = query.trim();
        if term.is_empty() {
            return self.list_students(options);
        }

        let mut sql = format!(
            "SELECT {COLUMNS} FROM Student WHERE {} {ORDER}",
            like_any(&SEARCHABLE, 1)
        );
        let mut params = vec![Value::Text(like_pattern(term))];
        paginate(&mut sql, &mut params, options);
        self.query_students(&sql, params)
    }

    /// Fetch a student by id, `None` when it does not exist.
    pub fn get_student(&self, id: i64) -> Result<Option<Student>> {
        Ok(self
            .conn()?
            .query_row(
                &format!("SELECT {COLUMNS} FROM Student WHERE id = ?1"),
                [id],
                row_to_student,
            )
            .optional()?)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Merge `changes` over the stored student.  Returns the number of rows
    /// changed.
    pub fn update_student(&self, id: i64, changes: &StudentUpdate) -> Result<usize> {
        let current = self
            .get_student(id)?
            .ok_or_else(|| StoreError::not_found("Student"))?;

        let name = required_name(changes.name.as_deref().unwrap_or(current.name.as_str()))?;
        let pick = |new: &Option<String>, old: String| new.clone().unwrap_or(old);

        let affected = self.conn()?.execute(
            "UPDATE Student
             SET name = ?1, className = ?2, tags = ?3, guardianName = ?4,
                 phone = ?5, wechat = ?6, whatsapp = ?7
             WHERE id = ?8",
            params![
                name,
                pick(&changes.class_name, current.class_name),
                pick(&changes.tags, current.tags),
                pick(&changes.guardian_name, current.guardian_name),
                pick(&changes.phone, current.phone),
                pick(&changes.wechat, current.wechat),
                pick(&changes.whatsapp, current.whatsapp),
                id,
            ],
        )?;
        Ok(affected)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a student.  Returns 0 when it did not exist.
    ///
    /// ON DELETE CASCADE: photo links and message records go with it.
    pub fn delete_student(&self, id: i64) -> Result<usize> {
        let affected = self
            .conn()?
            .execute("DELETE FROM Student WHERE id = ?1", [id])?;
        if affected > 0 {
            tracing::debug!(id, "student deleted");
        }
        Ok(affected)
    }

    pub(crate) fn query_students(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Student>> {
        let mut stmt = self.conn()?.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params), row_to_student)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn required_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::Validation("Student name is required".into()));
    }
    Ok(trimmed)
}

/// Map a `rusqlite::Row` to a [`Student`].  Contact columns added by a
/// migration are NULL on old rows and read back as empty strings.
fn row_to_student(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    let text = |idx: usize| -> rusqlite::Result<String> {
        Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
    };

    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        class_name: text(2)?,
        tags: text(3)?,
        guardian_name: text(4)?,
        phone: text(5)?,
        wechat: text(6)?,
        whatsapp: text(7)?,
        created_at: row.get(8)?,
    })
}
