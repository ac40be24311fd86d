//! File-level database backups with count-based retention.
//!
//! A backup is a copy of the database file taken right after a full WAL
//! checkpoint, stored as `<data>/backups/backup-<UTC timestamp>.db`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sundayschool_shared::constants::{BACKUP_EXTENSION, BACKUP_PREFIX};

use crate::database::Database;
use crate::error::Result;

/// A backup file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

impl Database {
    /// Flush the WAL into the database file, copy it into the backup
    /// directory and prune old backups.  Returns the new backup's path.
    ///
    /// A failed copy is returned; once the copy exists, pruning problems are
    /// only logged.
    pub fn backup(&self) -> Result<PathBuf> {
        let conn = self.conn()?;
        let backups_dir = &self.paths().backups_dir;
        fs::create_dir_all(backups_dir)?;

        let target = unique_backup_path(backups_dir, Utc::now());

        conn.query_row("PRAGMA wal_checkpoint(FULL)", [], |_| Ok(()))?;
        if let Err(e) = copy_fresh(self.storage_path(), &target) {
            tracing::error!(error = %e, target = %target.display(), "database backup failed");
            return Err(e.into());
        }
        tracing::info!(path = %target.display(), "database backup created");

        self.prune_backups(self.backup_retention());
        Ok(target)
    }

    /// Backups currently on disk, newest first.
    pub fn list_backups(&self) -> Result<Vec<BackupFile>> {
        let dir = &self.paths().backups_dir;
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !(name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_EXTENSION)) {
                continue;
            }
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            backups.push(BackupFile {
                path: entry.path(),
                size_bytes: meta.len(),
                modified_at: DateTime::<Utc>::from(meta.modified()?),
            });
        }

        backups.sort_by(|a, b| {
            b.modified_at
                .cmp(&a.modified_at)
                .then_with(|| b.path.cmp(&a.path))
        });
        Ok(backups)
    }

    fn prune_backups(&self, keep: usize) {
        let backups = match self.list_backups() {
            Ok(backups) => backups,
            Err(e) => {
                tracing::warn!(error = %e, "failed to list backups for pruning");
                return;
            }
        };

        for old in backups.into_iter().skip(keep) {
            match fs::remove_file(&old.path) {
                Ok(()) => tracing::info!(path = %old.path.display(), "old backup removed"),
                Err(e) => tracing::warn!(
                    path = %old.path.display(),
                    error = %e,
                    "failed to remove old backup"
                ),
            }
        }
    }
}

/// `backup-2024-05-01T08-30-00-123Z.db`, with `_NN` appended when backups
/// with that timestamp already exist.  The suffix is always above every
/// existing one, so a name freed by pruning is never reused.
fn unique_backup_path(dir: &Path, now: DateTime<Utc>) -> PathBuf {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let base = format!("{BACKUP_PREFIX}{stamp}");
    let plain = format!("{base}{BACKUP_EXTENSION}");
    let numbered = format!("{base}_");

    let mut next: Option<u32> = None;
    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let taken = if name == plain {
                Some(1)
            } else {
                name.strip_prefix(&numbered)
                    .and_then(|rest| rest.strip_suffix(BACKUP_EXTENSION))
                    .and_then(|n| n.parse::<u32>().ok())
                    .map(|n| n + 1)
            };
            if let Some(n) = taken {
                next = Some(next.map_or(n, |current| current.max(n)));
            }
        }
    }

    match next {
        None => dir.join(plain),
        Some(n) => dir.join(format!("{base}_{n:02}{BACKUP_EXTENSION}")),
    }
}

/// Copy `src` to `dest` and stamp `dest` with the current time, so the
/// retention order follows creation order on every platform.
fn copy_fresh(src: &Path, dest: &Path) -> std::io::Result<()> {
    fs::copy(src, dest)?;
    fs::OpenOptions::new()
        .write(true)
        .open(dest)?
        .set_modified(SystemTime::now())
}
