//! Store configuration loaded from environment variables.
//!
//! Every setting has a default, so the store opens with zero configuration
//! inside the platform data directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use sundayschool_shared::constants::{
    APP_DIR_NAME, APP_ORGANIZATION, APP_QUALIFIER, BACKUPS_DIR_NAME, DB_FILE_NAME,
    DEFAULT_BACKUP_RETENTION, MAX_PHOTO_SIZE, PHOTOS_DIR_NAME,
};

/// Store configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the database, photos and backups.
    /// Env: `SST_DATA_DIR`
    /// Default: the platform data directory, or `./data` when none exists.
    pub data_dir: Option<PathBuf>,

    /// Largest photo the importer accepts, in bytes.
    /// Env: `SST_MAX_PHOTO_BYTES`
    /// Default: 10 MiB
    pub max_photo_bytes: u64,

    /// Number of backups kept after each new backup.
    /// Env: `SST_BACKUP_RETENTION`
    /// Default: `5`
    pub backup_retention: usize,

    /// Whether the host takes a backup right after opening the store.
    /// Env: `SST_BACKUP_ON_START` (true/false)
    /// Default: `false`
    pub backup_on_start: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            max_photo_bytes: MAX_PHOTO_SIZE,
            backup_retention: DEFAULT_BACKUP_RETENTION,
            backup_on_start: false,
        }
    }
}

impl StoreConfig {
    /// Configuration rooted at an explicit data directory.
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("SST_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.data_dir = Some(PathBuf::from(dir));
            }
        }

        if let Ok(val) = std::env::var("SST_MAX_PHOTO_BYTES") {
            match parse_positive(&val) {
                Some(n) => config.max_photo_bytes = n,
                None => tracing::warn!(value = %val, "Invalid SST_MAX_PHOTO_BYTES, using default"),
            }
        }

        if let Ok(val) = std::env::var("SST_BACKUP_RETENTION") {
            match parse_positive(&val) {
                Some(n) => config.backup_retention = n as usize,
                None => tracing::warn!(value = %val, "Invalid SST_BACKUP_RETENTION, using default"),
            }
        }

        if let Ok(val) = std::env::var("SST_BACKUP_ON_START") {
            config.backup_on_start = parse_flag(&val);
        }

        config
    }
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Resolved on-disk layout of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePaths {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub photos_dir: PathBuf,
    pub backups_dir: PathBuf,
}

impl StoragePaths {
    /// Derive the layout from a configuration.
    ///
    /// The data directory is platform-specific when not configured:
    /// - Linux:   `~/.local/share/sundayschooltime`
    /// - macOS:   `~/Library/Application Support/com.sundayschool.SundaySchoolTime`
    /// - Windows: `{FOLDERID_RoamingAppData}\sundayschool\SundaySchoolTime\data`
    pub fn resolve(config: &StoreConfig) -> Self {
        let data_dir = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir(),
        };
        if data_dir.is_relative() {
            if let Ok(cwd) = std::env::current_dir() {
                return Self::under(&cwd.join(data_dir));
            }
        }
        Self::under(&data_dir)
    }

    pub fn under(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            db_path: data_dir.join(DB_FILE_NAME),
            photos_dir: data_dir.join(PHOTOS_DIR_NAME),
            backups_dir: data_dir.join(BACKUPS_DIR_NAME),
        }
    }
}

fn default_data_dir() -> PathBuf {
    match ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_DIR_NAME) {
        Some(dirs) => dirs.data_dir().to_path_buf(),
        None => {
            tracing::warn!("no platform data directory, falling back to ./data");
            PathBuf::from("data")
        }
    }
}
