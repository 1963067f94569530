//! Constants used throughout the filestash core crate.
//!
//! Path and filename constants live here so every component derives locations the same way.

/// Default data directory when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "filestash_data";

/// Directory name, inside the data directory, holding stored copies.
pub const STORAGE_DIR_NAME: &str = "storage";

/// Filename, inside the data directory, of the metadata log.
pub const METADATA_LOG_FILENAME: &str = "file_database.csv";

/// Default destination directory for downloads.
pub const DEFAULT_DOWNLOAD_DIR: &str = "./downloads";

/// Header row of the metadata log, in column order.
pub const METADATA_HEADER: [&str; 4] = [
    "key",
    "original_filename",
    "stored_filename",
    "upload_timestamp",
];

/// Textual format of `upload_timestamp` (UTC, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How many keys an upload draws before giving up on finding an unused one.
pub const MAX_KEY_ATTEMPTS: usize = 5;
