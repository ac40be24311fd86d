//! Records of messages composed for a student's guardians.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use sundayschool_shared::now_millis;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::models::{MessageFilter, MessageRecord, NewMessageRecord};

const COLUMNS: &str =
    "id, studentId, templateText, personalizedText, finalText, channel, createdAt";

impl Database {
    /// Store a message record and return its id.
    pub fn add_message_record(&self, record: &NewMessageRecord) -> Result<i64> {
        required(&record.template_text, "templateText")?;
        required(&record.final_text, "finalText")?;
        if !self.row_exists("Student", record.student_id)? {
            return Err(StoreError::not_found("Student"));
        }

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO MessageRecord
                 (studentId, templateText, personalizedText, finalText, channel, createdAt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.student_id,
                record.template_text,
                record.personalized_text,
                record.final_text,
                record.channel,
                now_millis(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!(id, student_id = record.student_id, "message record added");
        Ok(id)
    }

    pub fn get_message_record(&self, id: i64) -> Result<Option<MessageRecord>> {
        Ok(self
            .conn()?
            .query_row(
                &format!("SELECT {COLUMNS} FROM MessageRecord WHERE id = ?1"),
                [id],
                row_to_message_record,
            )
            .optional()?)
    }

    /// List records matching every filter that is set, newest first.
    pub fn list_message_records(&self, filter: &MessageFilter) -> Result<Vec<MessageRecord>> {
        let mut sql = format!("SELECT {COLUMNS} FROM MessageRecord WHERE 1=1");
        let mut params = Vec::new();

        let conditions = [
            ("studentId =", filter.student_id),
            ("createdAt >=", filter.from),
            ("createdAt <=", filter.to),
        ];
        for (condition, value) in conditions {
            if let Some(value) = value {
                params.push(Value::Integer(value));
                sql.push_str(&format!(" AND {condition} ?{}", params.len()));
            }
        }
        sql.push_str(" ORDER BY createdAt DESC, id DESC");

        let mut stmt = self.conn()?.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), row_to_message_record)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

fn required(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

fn row_to_message_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MessageRecord> {
    Ok(MessageRecord {
        id: row.get(0)?,
        student_id: row.get(1)?,
        template_text: row.get(2)?,
        personalized_text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        final_text: row.get(4)?,
        channel: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        created_at: row.get(6)?,
    })
}
