//! v001 -- guardian contact fields on `Student`.

use rusqlite::Connection;

use super::has_column;

const COLUMNS: [&str; 4] = ["guardianName", "phone", "wechat", "whatsapp"];

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    for column in COLUMNS {
        if !has_column(conn, "Student", column)? {
            conn.execute_batch(&format!("ALTER TABLE Student ADD COLUMN {column} TEXT"))?;
        }
    }
    Ok(())
}
