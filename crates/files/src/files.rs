//! Flat storage area implementation
//!
//! [`StorageArea`] copies files into and out of a single directory. Copies carry the
//! source's modification time along with its bytes, so a retrieved file looks like the one
//! that was archived.
//!
//! # Naming
//!
//! Stored names must be one plain path component. Anything containing a separator, `.` or
//! `..` is rejected before the filesystem is touched, which keeps every operation inside the
//! storage directory even when a name comes from a hand-edited metadata log.
//!
//! # Immutability
//!
//! A stored file is never overwritten. [`StorageArea::store_copy`] fails with
//! [`FilesError::AlreadyExists`] if the name is taken; the caller is expected to pick a new
//! key and try again.

use crate::FilesError;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};

/// Handle on the storage directory
///
/// Construction performs no I/O. Call [`StorageArea::ensure_exists`] once at startup.
#[derive(Debug, Clone)]
pub struct StorageArea {
    directory: PathBuf,
}

impl StorageArea {
    /// Creates a handle on `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Creates the storage directory (and parents) if it does not exist.
    ///
    /// Idempotent. Existing contents are left untouched.
    pub fn ensure_exists(&self) -> Result<(), FilesError> {
        fs::create_dir_all(&self.directory).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create storage directory {}: {}",
                    self.directory.display(),
                    e
                ),
            ))
        })
    }

    /// Returns the storage directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns where `stored_name` lives inside the storage area.
    ///
    /// # Errors
    ///
    /// Returns [`FilesError::InvalidName`] if `stored_name` is not a single plain component.
    pub fn path_for(&self, stored_name: &str) -> Result<PathBuf, FilesError> {
        validate_file_name(stored_name)?;
        Ok(self.directory.join(stored_name))
    }

    /// Returns true if `stored_name` currently exists as a regular file.
    ///
    /// Invalid names are reported as absent.
    pub fn contains(&self, stored_name: &str) -> bool {
        self.path_for(stored_name)
            .map(|path| path.is_file())
            .unwrap_or(false)
    }

    /// Copies `source_path` into the storage area under `stored_name`
    ///
    /// Content, modification time and permissions are copied. If the copy fails part way,
    /// the incomplete stored file is removed.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `source_path` does not exist or is not a regular file (`SourceNotFound`)
    /// - `stored_name` is not a single plain component (`InvalidName`)
    /// - a file is already stored under `stored_name` (`AlreadyExists`)
    /// - the copy itself fails (`Copy`)
    pub fn store_copy(&self, source_path: &Path, stored_name: &str) -> Result<PathBuf, FilesError> {
        if !source_path.is_file() {
            return Err(FilesError::SourceNotFound(source_path.to_path_buf()));
        }

        let dest = self.path_for(stored_name)?;
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&dest)
            .map_err(|e| match e.kind() {
                io::ErrorKind::AlreadyExists => FilesError::AlreadyExists(stored_name.to_owned()),
                _ => FilesError::Copy {
                    path: dest.clone(),
                    source: e,
                },
            })?;

        if let Err(e) = copy_with_mtime(source_path, &dest, file) {
            if let Err(cleanup) = fs::remove_file(&dest) {
                tracing::warn!(
                    stored = %dest.display(),
                    error = %cleanup,
                    "failed to remove incomplete copy"
                );
            }
            return Err(e);
        }

        tracing::debug!(
            source = %source_path.display(),
            stored = %dest.display(),
            "stored copy"
        );

        Ok(dest)
    }

    /// Copies the file stored under `stored_name` out to `dest_path`
    ///
    /// Missing parent directories of `dest_path` are created first. An existing file at
    /// `dest_path` is overwritten.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `stored_name` is not a single plain component (`InvalidName`)
    /// - nothing is stored under `stored_name` (`MissingFile`)
    /// - the destination directory cannot be created or the copy fails (`Copy`)
    pub fn retrieve_copy(&self, stored_name: &str, dest_path: &Path) -> Result<(), FilesError> {
        let source = self.path_for(stored_name)?;
        if !source.is_file() {
            return Err(FilesError::MissingFile(stored_name.to_owned()));
        }

        if let Some(parent) = dest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| FilesError::Copy {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let file = File::create(dest_path).map_err(|source| FilesError::Copy {
            path: dest_path.to_path_buf(),
            source,
        })?;
        copy_with_mtime(&source, dest_path, file)?;
        tracing::debug!(
            stored = %source.display(),
            dest = %dest_path.display(),
            "retrieved copy"
        );

        Ok(())
    }
}

/// Copies the bytes of `source` into `writer` (already open on `dest`), then its modification
/// time, then its permissions.
///
/// Permissions go last so a read-only source still produces a complete copy.
fn copy_with_mtime(source: &Path, dest: &Path, mut writer: File) -> Result<(), FilesError> {
    let copy_err = |source: io::Error| FilesError::Copy {
        path: dest.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(source).map_err(copy_err)?;
    let mut reader = File::open(source).map_err(copy_err)?;
    io::copy(&mut reader, &mut writer).map_err(copy_err)?;

    let modified = metadata.modified().map_err(copy_err)?;
    writer.set_modified(modified).map_err(copy_err)?;
    drop(writer);

    fs::set_permissions(dest, metadata.permissions()).map_err(copy_err)?;
    Ok(())
}

/// Checks that `name` is one plain path component, with no separator, `.` or `..`.
///
/// # Errors
///
/// Returns [`FilesError::InvalidName`] otherwise.
pub fn validate_file_name(name: &str) -> Result<(), FilesError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(component)), None) if component == name => Ok(()),
        _ => Err(FilesError::InvalidName(name.to_owned())),
    }
}
