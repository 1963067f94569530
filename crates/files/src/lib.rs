//! filestash storage area
//!
//! This crate owns the directory that holds the physical copies of archived files.
//!
//! ## Layout
//!
//! The storage area is a single flat directory. Each archived file is stored under a name
//! that combines its key with its original filename, so two uploads of `report.txt` never
//! collide:
//!
//! ```text
//! storage/
//! ├── 3f9ab01c_report.txt
//! └── 70c2e9d4_report.txt
//! ```
//!
//! The storage area knows nothing about keys or the metadata log. It only copies bytes in and
//! out under names it is given.
//!
//! ## Example Usage
//!
//! ```no_run
//! use filestash_files::StorageArea;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = StorageArea::new("filestash_data/storage");
//! storage.ensure_exists()?;
//! storage.store_copy(Path::new("report.txt"), "3f9ab01c_report.txt")?;
//! storage.retrieve_copy("3f9ab01c_report.txt", Path::new("downloads/report.txt"))?;
//! # Ok(())
//! # }
//! ```

mod files;

pub use files::{validate_file_name, StorageArea};

use std::path::PathBuf;

/// Errors that can occur during storage operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Source path does not exist or is not a regular file
    #[error("Source file does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// Stored file is absent from the storage area
    #[error("File missing in storage: {0}")]
    MissingFile(String),

    /// Stored name is already taken (stored files are never overwritten)
    #[error("Stored file already exists: {0}")]
    AlreadyExists(String),

    /// Stored name is not a single plain path component
    #[error("Invalid stored name: {0}")]
    InvalidName(String),

    /// Copy into or out of the storage area failed
    #[error("Failed to copy {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
