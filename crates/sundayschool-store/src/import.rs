//! Checks and naming for photos entering managed storage.

use std::path::Path;

use rand::distributions::Alphanumeric;
use rand::Rng;
use sundayschool_shared::constants::{
    ALLOWED_PHOTO_EXTENSIONS, ALLOWED_PHOTO_MIME_TYPES, PHOTO_NAME_SUFFIX_LEN,
};

use crate::error::{Result, StoreError};

/// Reject files whose extension is not an allowed image type.
pub(crate) fn check_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
        .unwrap_or_default();

    if ALLOWED_PHOTO_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(StoreError::UnsupportedFileType { extension })
    }
}

/// Reject files whose guessed MIME type is not an allowed image type.
///
/// When no MIME type can be guessed the extension check stands on its own.
pub(crate) fn check_mime(path: &Path) -> Result<()> {
    match mime_guess::from_path(path).first() {
        Some(mime) => {
            let essence = mime.essence_str();
            if ALLOWED_PHOTO_MIME_TYPES.contains(&essence) {
                Ok(())
            } else {
                Err(StoreError::UnsupportedMimeType {
                    mime: essence.to_string(),
                })
            }
        }
        None => {
            tracing::warn!(
                path = %path.display(),
                "MIME type lookup failed, falling back to extension check"
            );
            Ok(())
        }
    }
}

/// Reject files larger than `max` bytes.
pub(crate) fn check_size(size: u64, max: u64) -> Result<()> {
    if size > max {
        return Err(StoreError::FileTooLarge { size, max });
    }
    Ok(())
}

/// Name for the managed copy of `source`:
/// `<millis>_<random suffix>_<original stem><original extension>`.
pub(crate) fn managed_file_name(source: &Path, now_millis: i64) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PHOTO_NAME_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    format!("{now_millis}_{suffix}_{stem}{extension}")
}
