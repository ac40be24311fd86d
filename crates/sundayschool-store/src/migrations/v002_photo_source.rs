//! v002 -- remember where an imported photo was copied from.

use rusqlite::Connection;

use super::has_column;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    if !has_column(conn, "Photo", "sourcePath")? {
        conn.execute_batch("ALTER TABLE Photo ADD COLUMN sourcePath TEXT")?;
    }
    conn.execute_batch("CREATE INDEX IF NOT EXISTS idx_photo_sourcePath ON Photo(sourcePath)")
}
