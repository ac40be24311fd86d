//! Photo records and the import pipeline that copies files into managed
//! storage.
//!
//! Rows always point into `<data>/photos`.  Reads re-apply timestamp
//! normalization, so values written by older builds in seconds come back
//! in milliseconds.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use sundayschool_shared::{normalize_millis, now_millis};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::import::{check_extension, check_mime, check_size, managed_file_name};
use crate::models::{ListOptions, NewPhoto, Photo, PhotoUpdate};
use crate::query::{like_any, like_pattern, paginate};

pub(crate) const COLUMNS: &str = "id, filePath, fileName, capturedAt, createdAt";

const SEARCHABLE: [&str; 2] = ["fileName", "filePath"];

const ORDER: &str = "ORDER BY createdAt DESC, id DESC";

/// First schema version with `Photo.sourcePath`.
const SOURCE_PATH_VERSION: u32 = 2;

impl Database {
    // ------------------------------------------------------------------
    // Create
    // ------------------------------------------------------------------

    /// Import a photo and return its id.
    ///
    /// Files outside managed storage are copied in under a fresh name;
    /// files already inside are recorded under their canonical path.
    /// Importing the same file again returns the existing id.
    pub fn add_photo(&self, photo: &NewPhoto) -> Result<i64> {
        let photos_dir = &self.paths().photos_dir;
        fs::create_dir_all(photos_dir)?;

        let source = photo.file_path.as_path();
        if source.as_os_str().is_empty() || !source.is_file() {
            return Err(StoreError::SourceMissing(source.to_path_buf()));
        }

        check_extension(source)?;
        check_mime(source)?;
        check_size(fs::metadata(source)?.len(), self.max_photo_bytes())?;

        // validated before any copy so a bad value never leaves a stray file
        let captured_at = normalize_millis(photo.captured_at, "capturedAt")?;

        let canonical_source = fs::canonicalize(source)?;
        let managed_relative = canonical_source
            .strip_prefix(fs::canonicalize(photos_dir)?)
            .ok()
            .map(Path::to_path_buf);
        let tracks_source = self.schema_version() >= SOURCE_PATH_VERSION;

        let mut file_name = photo.file_name.clone().filter(|name| !name.is_empty());
        let mut source_path = None;

        // every spelling of a managed file maps to one stored path
        let final_path = if let Some(relative) = managed_relative {
            photos_dir.join(relative)
        } else {
            let source_key = canonical_source.to_string_lossy().into_owned();
            if tracks_source {
                if let Some(id) = self.photo_imported_from(&source_key)? {
                    tracing::debug!(id, source = %source_key, "photo already imported");
                    return Ok(id);
                }
            }

            let target = photos_dir.join(managed_file_name(source, now_millis()));
            if let Err(e) = fs::copy(source, &target) {
                tracing::error!(
                    source = %source.display(),
                    target = %target.display(),
                    error = %e,
                    "failed to copy photo file"
                );
                return Err(StoreError::ImportFailed(e.to_string()));
            }
            source_path = Some(source_key);
            target
        };

        if file_name.is_none() {
            file_name = source
                .file_name()
                .map(|name| name.to_string_lossy().into_owned());
        }

        let final_key = final_path.to_string_lossy().into_owned();
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM Photo WHERE filePath = ?1",
                [&final_key],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(id) = existing {
            return Ok(id);
        }

        let file_name = file_name.unwrap_or_default();
        if tracks_source {
            conn.execute(
                "INSERT INTO Photo (filePath, fileName, capturedAt, createdAt, sourcePath)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![final_key, file_name, captured_at, now_millis(), source_path],
            )?;
        } else {
            conn.execute(
                "INSERT INTO Photo (filePath, fileName, capturedAt, createdAt)
                 VALUES (?1, ?2, ?3, ?4)",
                params![final_key, file_name, captured_at, now_millis()],
            )?;
        }

        let id = conn.last_insert_rowid();
        tracing::info!(id, path = %final_key, "photo imported");
        Ok(id)
    }

    /// Id of the photo previously copied from `source`, if its managed copy
    /// is still on disk.
    fn photo_imported_from(&self, source: &str) -> Result<Option<i64>> {
        let found: Option<(i64, String)> = self
            .conn()?
            .query_row(
                "SELECT id, filePath FROM Photo WHERE sourcePath = ?1
                 ORDER BY id DESC LIMIT 1",
                [source],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(found
            .filter(|(_, path)| Path::new(path).is_file())
            .map(|(id, _)| id))
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// List photos, newest first.
    pub fn list_photos(&self, options: ListOptions) -> Result<Vec<Photo>> {
        let mut sql = format!("SELECT {COLUMNS} FROM Photo {ORDER}");
        let mut params = Vec::new();
        paginate(&mut sql, &mut params, options);
        self.query_photos(&sql, params)
    }

    pub fn count_photos(&self) -> Result<i64> {
        Ok(self
            .conn()?
            .query_row("SELECT COUNT(*) FROM Photo", [], |row| row.get(0))?)
    }

    /// Substring search over file name and path.  A blank query lists every
    /// photo.
    pub fn search_photos(&self, query: &str, options: ListOptions) -> Result<Vec<Photo>> {
        let term = query.trim();
        if term.is_empty() {
            return self.list_photos(options);
        }

        let mut sql = format!(
            "SELECT {COLUMNS} FROM Photo WHERE {} {ORDER}",
            like_any(&SEARCHABLE, 1)
        );
        let mut params = vec![Value::Text(like_pattern(term))];
        paginate(&mut sql, &mut params, options);
        self.query_photos(&sql, params)
    }

    pub fn get_photo(&self, id: i64) -> Result<Option<Photo>> {
        Ok(self
            .conn()?
            .query_row(
                &format!("SELECT {COLUMNS} FROM Photo WHERE id = ?1"),
                [id],
                row_to_photo,
            )
            .optional()?)
    }

    // ------------------------------------------------------------------
    // Update
    // ------------------------------------------------------------------

    /// Merge `changes` over the stored photo.  A `None` capture time keeps
    /// the stored one.
    pub fn update_photo(&self, id: i64, changes: &PhotoUpdate) -> Result<usize> {
        let current = self
            .get_photo(id)?
            .ok_or_else(|| StoreError::not_found("Photo"))?;

        let captured_at =
            normalize_millis(changes.captured_at, "capturedAt")?.or(current.captured_at);
        let file_name = changes.file_name.clone().unwrap_or(current.file_name);

        let affected = self.conn()?.execute(
            "UPDATE Photo SET fileName = ?1, capturedAt = ?2 WHERE id = ?3",
            params![file_name, captured_at, id],
        )?;
        Ok(affected)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete a photo row, then its file.  A missing row is an error; a file
    /// that cannot be removed is only logged.
    pub fn delete_photo(&self, id: i64) -> Result<usize> {
        let photo = self
            .get_photo(id)?
            .ok_or_else(|| StoreError::not_found("Photo"))?;

        let affected = self
            .conn()?
            .execute("DELETE FROM Photo WHERE id = ?1", [id])?;

        let path = PathBuf::from(&photo.file_path);
        if path.exists() {
            match fs::remove_file(&path) {
                Ok(()) => tracing::debug!(id, path = %path.display(), "photo file removed"),
                Err(e) => tracing::warn!(
                    id,
                    path = %path.display(),
                    error = %e,
                    "failed to delete photo file"
                ),
            }
        }

        Ok(affected)
    }

    pub(crate) fn query_photos(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Photo>> {
        let mut stmt = self.conn()?.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params), row_to_photo)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(StoreError::Sqlite)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Map a `rusqlite::Row` to a [`Photo`], normalizing `capturedAt`.
fn row_to_photo(row: &rusqlite::Row<'_>) -> rusqlite::Result<Photo> {
    let raw_captured: Option<i64> = row.get(3)?;
    let captured_at = normalize_millis(raw_captured.map(|v| v as f64), "capturedAt").map_err(
        |e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Integer, Box::new(e)),
    )?;

    Ok(Photo {
        id: row.get(0)?,
        file_path: row.get(1)?,
        file_name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        captured_at,
        created_at: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const JPEG_HEADER: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("data")).unwrap();
        (dir, db)
    }

    fn source(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, JPEG_HEADER).unwrap();
        path
    }

    #[test]
    fn import_copies_into_managed_storage() {
        let (dir, db) = open();
        let src = source(&dir, "picnic.jpg");

        let id = db.add_photo(&NewPhoto::from_path(&src)).unwrap();
        let photo = db.get_photo(id).unwrap().unwrap();

        let stored = Path::new(&photo.file_path);
        assert!(stored.starts_with(db.photos_dir()));
        assert!(stored.is_file());
        assert!(photo.file_path.ends_with("_picnic.jpg"));
        assert_eq!(photo.file_name, "picnic.jpg");
        assert_eq!(photo.captured_at, None);
        assert!(src.exists(), "source is left in place");
    }

    #[test]
    fn explicit_file_name_and_capture_time() {
        let (dir, db) = open();
        let src = source(&dir, "img_001.png");

        let id = db
            .add_photo(&NewPhoto {
                file_path: src,
                file_name: Some("Easter morning".into()),
                captured_at: Some(1_700_000_000.0),
            })
            .unwrap();

        let photo = db.get_photo(id).unwrap().unwrap();
        assert_eq!(photo.file_name, "Easter morning");
        assert_eq!(photo.captured_at, Some(1_700_000_000_000));
    }

    #[test]
    fn invalid_capture_time_leaves_no_copy() {
        let (dir, db) = open();
        let src = source(&dir, "a.jpg");

        let err = db
            .add_photo(&NewPhoto {
                file_path: src,
                file_name: None,
                captured_at: Some(-5.0),
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Timestamp(_)));
        assert_eq!(fs::read_dir(db.photos_dir()).unwrap().count(), 0);
        assert_eq!(db.count_photos().unwrap(), 0);
    }

    #[test]
    fn missing_source() {
        let (dir, db) = open();
        let err = db
            .add_photo(&NewPhoto::from_path(dir.path().join("gone.jpg")))
            .unwrap_err();
        assert!(matches!(err, StoreError::SourceMissing(_)));

        let err = db.add_photo(&NewPhoto::default()).unwrap_err();
        assert!(matches!(err, StoreError::SourceMissing(_)));
    }

    #[test]
    fn stored_seconds_read_back_as_millis() {
        let (dir, db) = open();
        let id = db.add_photo(&NewPhoto::from_path(source(&dir, "a.jpg"))).unwrap();
        db.conn()
            .unwrap()
            .execute(
                "UPDATE Photo SET capturedAt = 1700000000 WHERE id = ?1",
                [id],
            )
            .unwrap();

        assert_eq!(
            db.get_photo(id).unwrap().unwrap().captured_at,
            Some(1_700_000_000_000)
        );
        assert_eq!(
            db.list_photos(ListOptions::default()).unwrap()[0].captured_at,
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn update_merges_and_keeps_capture_time() {
        let (dir, db) = open();
        let id = db
            .add_photo(&NewPhoto {
                file_path: source(&dir, "a.jpg"),
                file_name: None,
                captured_at: Some(1_600_000_000_000.0),
            })
            .unwrap();

        let changed = db
            .update_photo(
                id,
                &PhotoUpdate {
                    file_name: Some("Choir".into()),
                    captured_at: None,
                },
            )
            .unwrap();
        assert_eq!(changed, 1);
        let photo = db.get_photo(id).unwrap().unwrap();
        assert_eq!(photo.file_name, "Choir");
        assert_eq!(photo.captured_at, Some(1_600_000_000_000));

        db.update_photo(
            id,
            &PhotoUpdate {
                file_name: None,
                captured_at: Some(1_650_000_000.0),
            },
        )
        .unwrap();
        let photo = db.get_photo(id).unwrap().unwrap();
        assert_eq!(photo.file_name, "Choir");
        assert_eq!(photo.captured_at, Some(1_650_000_000_000));

        assert!(matches!(
            db.update_photo(id, &PhotoUpdate {
                file_name: None,
                captured_at: Some(f64::NAN),
            }),
            Err(StoreError::Timestamp(_))
        ));
        assert!(matches!(
            db.update_photo(id + 1, &PhotoUpdate::default()),
            Err(StoreError::NotFound { entity: "Photo" })
        ));
    }

    #[test]
    fn delete_removes_row_and_file() {
        let (dir, db) = open();
        let id = db.add_photo(&NewPhoto::from_path(source(&dir, "a.jpg"))).unwrap();
        let stored = PathBuf::from(db.get_photo(id).unwrap().unwrap().file_path);

        assert_eq!(db.delete_photo(id).unwrap(), 1);
        assert!(!stored.exists());
        assert!(db.get_photo(id).unwrap().is_none());

        assert!(matches!(
            db.delete_photo(id),
            Err(StoreError::NotFound { entity: "Photo" })
        ));
    }

    #[test]
    fn delete_survives_missing_file() {
        let (dir, db) = open();
        let id = db.add_photo(&NewPhoto::from_path(source(&dir, "a.jpg"))).unwrap();
        fs::remove_file(db.get_photo(id).unwrap().unwrap().file_path).unwrap();

        assert_eq!(db.delete_photo(id).unwrap(), 1);
        assert_eq!(db.count_photos().unwrap(), 0);
    }

    #[test]
    fn search_and_paging() {
        let (dir, db) = open();
        for name in ["beach.jpg", "choir.png", "beach_party.gif"] {
            db.add_photo(&NewPhoto::from_path(source(&dir, name))).unwrap();
        }

        let names = |q: &str, options: ListOptions| -> Vec<String> {
            db.search_photos(q, options)
                .unwrap()
                .into_iter()
                .map(|p| p.file_name)
                .collect()
        };

        assert_eq!(
            names("BEACH", ListOptions::default()),
            vec!["beach_party.gif", "beach.jpg"]
        );
        assert_eq!(names("beach", ListOptions::page(1, 1)), vec!["beach.jpg"]);
        assert_eq!(names("h_p", ListOptions::default()), vec!["beach_party.gif"]);
        assert_eq!(names("", ListOptions::default()).len(), 3);
        assert_eq!(
            db.search_photos(" ", ListOptions::page(2, 0)).unwrap(),
            db.list_photos(ListOptions::page(2, 0)).unwrap()
        );
        assert_eq!(db.count_photos().unwrap(), 3);
    }

    #[test]
    fn managed_file_spellings_share_one_row() {
        let (_dir, db) = open();
        fs::create_dir_all(db.photos_dir()).unwrap();
        let plain = db.photos_dir().join("a.png");
        fs::write(&plain, [0x89, b'P', b'N', b'G']).unwrap();
        let dotted = db.photos_dir().join("..").join("photos").join("a.png");

        let first = db.add_photo(&NewPhoto::from_path(&plain)).unwrap();
        let second = db.add_photo(&NewPhoto::from_path(&dotted)).unwrap();

        assert_eq!(first, second);
        assert_eq!(db.count_photos().unwrap(), 1);
        let stored = db.get_photo(first).unwrap().unwrap();
        assert_eq!(PathBuf::from(&stored.file_path), plain);
        assert_eq!(stored.file_name, "a.png");
    }
}
