//! Core runtime configuration.
//!
//! Locations are resolved once at process startup and passed into [`ArchiveService`]. Core
//! code never reads environment variables; binaries do that and hand the result in, which
//! lets tests point independent instances at temporary directories.
//!
//! [`ArchiveService`]: crate::ArchiveService

use crate::constants::{DEFAULT_DATA_DIR, METADATA_LOG_FILENAME, STORAGE_DIR_NAME};
use crate::{ArchiveError, ArchiveResult};
use std::path::{Path, PathBuf};

/// Archive configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveConfig {
    storage_dir: PathBuf,
    metadata_log: PathBuf,
}

impl ArchiveConfig {
    /// Create a new `ArchiveConfig` from explicit locations.
    pub fn new(storage_dir: PathBuf, metadata_log: PathBuf) -> ArchiveResult<Self> {
        if storage_dir.as_os_str().is_empty() {
            return Err(ArchiveError::InvalidConfig(
                "storage directory cannot be empty".into(),
            ));
        }
        if metadata_log.file_name().is_none() {
            return Err(ArchiveError::InvalidConfig(format!(
                "metadata log path has no file name: {}",
                metadata_log.display()
            )));
        }

        Ok(Self {
            storage_dir,
            metadata_log,
        })
    }

    /// Standard layout under one data directory: `<data_dir>/storage/` and
    /// `<data_dir>/file_database.csv`.
    pub fn from_data_dir(data_dir: &Path) -> Self {
        Self {
            storage_dir: data_dir.join(STORAGE_DIR_NAME),
            metadata_log: data_dir.join(METADATA_LOG_FILENAME),
        }
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    pub fn metadata_log(&self) -> &Path {
        &self.metadata_log
    }
}

/// Resolve the data directory without reading environment variables.
///
/// A non-blank `override_dir` wins; it may not exist yet, but if it does it must be a
/// directory. Otherwise [`DEFAULT_DATA_DIR`] relative to the working directory is used.
pub fn resolve_data_dir(override_dir: Option<PathBuf>) -> ArchiveResult<PathBuf> {
    let override_dir = override_dir.filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty());

    match override_dir {
        Some(dir) if dir.exists() && !dir.is_dir() => Err(ArchiveError::InvalidConfig(format!(
            "data directory override is not a directory: {}",
            dir.display()
        ))),
        Some(dir) => Ok(dir),
        None => Ok(PathBuf::from(DEFAULT_DATA_DIR)),
    }
}
