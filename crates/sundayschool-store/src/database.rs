//! Database connection management.
//!
//! The [`Database`] struct owns the single [`rusqlite::Connection`] of the
//! process together with the on-disk layout (database file, managed photo
//! storage, backups).  Schema creation and migrations run before the handle
//! is handed out.
//!
//! `Database` is `Send` but not `Sync`; share it between threads behind a
//! `Mutex`.

use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;

use crate::config::{StoragePaths, StoreConfig};
use crate::error::{Result, StoreError};
use crate::migrations;

/// Row counts across all tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    pub students: i64,
    pub photos: i64,
    pub links: i64,
    pub message_records: i64,
}

/// Handle to the application database.
pub struct Database {
    paths: StoragePaths,
    max_photo_bytes: u64,
    backup_retention: usize,
    schema_version: u32,
    conn: Option<Connection>,
}

impl Database {
    /// Open (or create) the database described by `config`.
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let mut db = Self::new(config);
        db.initialize()?;
        Ok(db)
    }

    /// Open (or create) a database inside an explicit data directory, with
    /// default limits.
    ///
    /// This is useful for tests and for embedding the store inside custom
    /// directory layouts.
    pub fn open_at(data_dir: &Path) -> Result<Self> {
        Self::open(&StoreConfig::at(data_dir))
    }

    /// Build a closed handle; nothing touches the disk until
    /// [`Database::initialize`].
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            paths: StoragePaths::resolve(config),
            max_photo_bytes: config.max_photo_bytes,
            backup_retention: config.backup_retention,
            schema_version: 0,
            conn: None,
        }
    }

    /// Open the connection if it is not open yet and return it.
    ///
    /// Schema creation errors are returned.  Migration errors are logged and
    /// the store keeps running on the schema it has.
    pub fn initialize(&mut self) -> Result<&Connection> {
        if self.conn.is_none() {
            let conn = self.connect()?;
            self.conn = Some(conn);
        }
        self.conn()
    }

    fn connect(&mut self) -> Result<Connection> {
        std::fs::create_dir_all(&self.paths.data_dir)?;

        tracing::info!(path = %self.paths.db_path.display(), "opening database");

        let conn = Connection::open(&self.paths.db_path)?;

        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::create_schema(&conn)?;

        self.schema_version = match migrations::run_migrations(&conn) {
            Ok(version) => version,
            Err(e) => {
                tracing::error!(error = %e, "database migration failed, continuing on current schema");
                migrations::schema_version(&conn).unwrap_or(0)
            }
        };

        Ok(conn)
    }

    /// Release the connection.  Safe to call on a closed handle.
    pub fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Err((_, e)) = conn.close() {
                tracing::warn!(error = %e, "error while closing database");
            }
            tracing::info!("database closed");
        }
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Return a reference to the underlying `rusqlite::Connection`.
    pub fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }

    /// Filesystem path of the database file.
    pub fn storage_path(&self) -> &Path {
        &self.paths.db_path
    }

    pub fn data_dir(&self) -> &Path {
        &self.paths.data_dir
    }

    /// Managed photo storage.
    pub fn photos_dir(&self) -> &Path {
        &self.paths.photos_dir
    }

    pub fn backups_dir(&self) -> &Path {
        &self.paths.backups_dir
    }

    /// Schema version reached by the last [`Database::initialize`].
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub(crate) fn max_photo_bytes(&self) -> u64 {
        self.max_photo_bytes
    }

    pub(crate) fn backup_retention(&self) -> usize {
        self.backup_retention
    }

    /// Count the rows of every table.
    pub fn inventory(&self) -> Result<Inventory> {
        let conn = self.conn()?;
        let count = |table: &str| -> Result<i64> {
            Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?)
        };

        Ok(Inventory {
            students: count("Student")?,
            photos: count("Photo")?,
            links: count("StudentPhoto")?,
            message_records: count("MessageRecord")?,
        })
    }

    /// Whether a row with `id` exists in `table`.
    pub(crate) fn row_exists(&self, table: &str, id: i64) -> Result<bool> {
        let found = self.conn()?.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)"),
            [id],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(found)
    }

    pub(crate) fn paths(&self) -> &StoragePaths {
        &self.paths
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(dir.path()).expect("should open");

        assert!(db.is_open());
        assert!(db.storage_path().exists());
        assert_eq!(db.schema_version(), migrations::CURRENT_VERSION);
        assert_eq!(db.photos_dir(), dir.path().join("photos"));
    }

    #[test]
    fn pragmas_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(dir.path()).unwrap();
        let conn = db.conn().unwrap();

        let mode: String = conn
            .pragma_query_value(None, "journal_mode", |row| row.get(0))
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");

        let fk: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);

        // NORMAL == 1
        let sync: i64 = conn
            .pragma_query_value(None, "synchronous", |row| row.get(0))
            .unwrap();
        assert_eq!(sync, 1);
    }

    #[test]
    fn initialize_and_close_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut db = Database::open_at(dir.path()).unwrap();

        db.initialize().unwrap();
        db.initialize().unwrap();

        db.close();
        db.close();
        assert!(!db.is_open());
        assert!(matches!(db.inventory(), Err(StoreError::Closed)));

        db.initialize().unwrap();
        assert!(db.inventory().is_ok());
    }

    #[test]
    fn data_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let db = Database::open_at(dir.path()).unwrap();
            db.conn()
                .unwrap()
                .execute(
                    "INSERT INTO Student (name, createdAt) VALUES ('Alice', 1)",
                    [],
                )
                .unwrap();
        }

        let db = Database::open_at(dir.path()).unwrap();
        assert_eq!(db.inventory().unwrap().students, 1);
    }
}
