//! Schema creation and the versioned migration runner.
//!
//! [`create_schema`] runs first on every open and is fatal on failure.
//! [`run_migrations`] then walks `PRAGMA user_version` up to
//! [`CURRENT_VERSION`]; each step is idempotent and is committed together
//! with its version bump.

mod base;
pub mod v001_contact_fields;
pub mod v002_photo_source;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.  Bump this and register a new step whenever the
/// schema changes.
pub const CURRENT_VERSION: u32 = 2;

type Step = fn(&Connection) -> std::result::Result<(), rusqlite::Error>;

/// Steps keyed by the version they upgrade from.
const STEPS: &[(u32, Step)] = &[
    (0, v001_contact_fields::up),
    (1, v002_photo_source::up),
];

/// Create every table and index that does not exist yet.
pub fn create_schema(conn: &Connection) -> Result<()> {
    base::create(conn)?;
    Ok(())
}

/// Read `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> Result<u32> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Run all pending migrations and return the version reached.
pub fn run_migrations(conn: &Connection) -> Result<u32> {
    apply_steps(conn, STEPS, CURRENT_VERSION)
}

fn apply_steps(conn: &Connection, steps: &[(u32, Step)], target: u32) -> Result<u32> {
    let current = schema_version(conn)?;

    tracing::info!(
        current_version = current,
        target_version = target,
        "checking database migrations"
    );

    for from in current..target {
        let step = steps
            .iter()
            .find(|(version, _)| *version == from)
            .map(|(_, step)| *step)
            .ok_or_else(|| StoreError::Migration(format!("no migration registered for v{from}")))?;

        let tx = conn.unchecked_transaction()?;
        step(&tx).map_err(|e| StoreError::Migration(format!("v{from} -> v{}: {e}", from + 1)))?;
        tx.pragma_update(None, "user_version", from + 1)?;
        tx.commit()?;

        tracing::info!(version = from + 1, "applied migration");
    }

    schema_version(conn)
}

/// Whether `table` has a column called `column`.
pub(crate) fn has_column(
    conn: &Connection,
    table: &str,
    column: &str,
) -> std::result::Result<bool, rusqlite::Error> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
