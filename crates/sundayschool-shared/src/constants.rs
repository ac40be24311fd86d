/// Application name
pub const APP_NAME: &str = "Sunday School Time";

/// `ProjectDirs` qualifier / organization / application triple
pub const APP_QUALIFIER: &str = "com";
pub const APP_ORGANIZATION: &str = "sundayschool";
pub const APP_DIR_NAME: &str = "SundaySchoolTime";

/// Database file name inside the data directory
pub const DB_FILE_NAME: &str = "sunday-school-time.db";

/// Managed photo storage, relative to the data directory
pub const PHOTOS_DIR_NAME: &str = "photos";

/// Backup directory, relative to the data directory
pub const BACKUPS_DIR_NAME: &str = "backups";

/// Backup file name prefix and extension
pub const BACKUP_PREFIX: &str = "backup-";
pub const BACKUP_EXTENSION: &str = ".db";

/// Number of backups kept after each new backup
pub const DEFAULT_BACKUP_RETENTION: usize = 5;

/// Maximum size of an imported photo in bytes (10 MiB)
pub const MAX_PHOTO_SIZE: u64 = 10 * 1024 * 1024;

/// Lower-case photo extensions accepted by the importer, with the leading dot
pub const ALLOWED_PHOTO_EXTENSIONS: [&str; 6] = [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"];

/// MIME types accepted by the importer
pub const ALLOWED_PHOTO_MIME_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
];

/// Timestamps below this value are taken to be Unix seconds
pub const MILLIS_THRESHOLD: f64 = 1e12;

/// Length of the random suffix in generated photo file names
pub const PHOTO_NAME_SUFFIX_LEN: usize = 6;
