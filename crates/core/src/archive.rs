//! Upload and download orchestration.
//!
//! [`ArchiveService`] ties the storage area and the metadata log together. Each operation is
//! a straight line of steps that runs to completion:
//!
//! - **upload**: validate source → allocate key → copy into storage → append record
//! - **download**: look up key → check stored file → copy out
//!
//! The record is appended only after the copy succeeds, so the log never points at a file
//! that was never stored. The reverse (a stored file whose append then fails) is possible and
//! is left in place.

use crate::config::ArchiveConfig;
use crate::constants::MAX_KEY_ATTEMPTS;
use crate::metadata::{MetadataStore, Record};
use crate::{ArchiveError, ArchiveResult};
use chrono::{SubsecRound, Utc};
use filestash_files::{validate_file_name, FilesError, StorageArea};
use filestash_key::FileKey;
use std::path::{Path, PathBuf};

/// Archive operations over one storage area and one metadata log.
#[derive(Debug, Clone)]
pub struct ArchiveService {
    storage: StorageArea,
    metadata: MetadataStore,
}

impl ArchiveService {
    /// Bootstraps the archive described by `config` and returns a service over it.
    ///
    /// Creates the storage directory and the metadata log (with its header) when absent.
    /// Existing data is never touched, so this runs on every session start.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::StorageSetup`] or [`ArchiveError::Metadata`] if either location
    /// cannot be created.
    pub fn open(config: &ArchiveConfig) -> ArchiveResult<Self> {
        let storage = StorageArea::new(config.storage_dir());
        storage.ensure_exists().map_err(ArchiveError::StorageSetup)?;

        let metadata = MetadataStore::new(config.metadata_log());
        metadata.initialize()?;

        tracing::info!(
            storage = %config.storage_dir().display(),
            metadata = %config.metadata_log().display(),
            "archive ready"
        );

        Ok(Self { storage, metadata })
    }

    pub fn storage(&self) -> &StorageArea {
        &self.storage
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Copies `source_path` into the archive and records it under a fresh key.
    ///
    /// # Returns
    ///
    /// The record that was appended; `record.key` is the key to download it with.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::SourceNotFound`] if `source_path` is not an existing regular file
    /// - [`ArchiveError::KeyExhausted`] if no unused key could be drawn
    /// - [`ArchiveError::Copy`] if the copy into storage fails
    /// - [`ArchiveError::Metadata`] if the log cannot be read or written
    ///
    /// Nothing is appended to the log on any of these failures.
    pub fn upload(&self, source_path: &Path) -> ArchiveResult<Record> {
        self.upload_with_key_source(source_path, FileKey::generate)
    }

    pub(crate) fn upload_with_key_source(
        &self,
        source_path: &Path,
        key_source: impl FnMut() -> FileKey,
    ) -> ArchiveResult<Record> {
        if !source_path.is_file() {
            tracing::warn!(source = %source_path.display(), "upload source not found");
            return Err(ArchiveError::SourceNotFound(source_path.to_path_buf()));
        }

        let original_filename = source_path
            .file_name()
            .ok_or_else(|| ArchiveError::SourceNotFound(source_path.to_path_buf()))?
            .to_str()
            .ok_or_else(|| ArchiveError::InvalidFilename(source_path.to_path_buf()))?;

        let key = self.allocate_key(original_filename, key_source)?;

        self.storage
            .store_copy(source_path, &key.stored_filename(original_filename))
            .map_err(|e| match e {
                FilesError::SourceNotFound(path) => ArchiveError::SourceNotFound(path),
                other => ArchiveError::Copy(other),
            })?;

        let record = Record::new(key, original_filename, Utc::now().trunc_subsecs(0));
        self.metadata.append(&record)?;

        tracing::info!(
            key = %record.key,
            original = %record.original_filename,
            "uploaded"
        );
        Ok(record)
    }

    /// Draws keys until one is unused by both the log and the storage area.
    fn allocate_key(
        &self,
        original_filename: &str,
        mut key_source: impl FnMut() -> FileKey,
    ) -> ArchiveResult<FileKey> {
        for attempt in 1..=MAX_KEY_ATTEMPTS {
            let key = key_source();
            let taken = self.storage.contains(&key.stored_filename(original_filename))
                || self.metadata.find_by_key(key.as_str())?.is_some();

            if !taken {
                return Ok(key);
            }
            tracing::debug!(%key, attempt, "key already in use, drawing again");
        }

        Err(ArchiveError::KeyExhausted(MAX_KEY_ATTEMPTS))
    }

    /// Copies the file recorded under `key` into `target_dir`, under its original name.
    ///
    /// `target_dir` is created if needed and an existing file of the same name there is
    /// overwritten.
    ///
    /// # Returns
    ///
    /// The path of the downloaded copy.
    ///
    /// # Errors
    ///
    /// - [`ArchiveError::InvalidKey`] if no record has this key
    /// - [`ArchiveError::UnsafeFilename`] if the recorded original name is not a plain file name
    /// - [`ArchiveError::MissingFile`] if the record exists but its stored file is gone
    /// - [`ArchiveError::Copy`] if the copy out of storage fails
    /// - [`ArchiveError::Metadata`] if the log cannot be read
    pub fn download(&self, key: &str, target_dir: &Path) -> ArchiveResult<PathBuf> {
        let record = self.metadata.find_by_key(key)?.ok_or_else(|| {
            tracing::warn!(key, "download with unknown key");
            ArchiveError::InvalidKey(key.to_owned())
        })?;

        validate_file_name(&record.original_filename).map_err(|_| {
            tracing::warn!(key, original = %record.original_filename, "unsafe recorded file name");
            ArchiveError::UnsafeFilename(record.original_filename.clone())
        })?;

        if !self.storage.contains(&record.stored_filename) {
            tracing::warn!(key, stored = %record.stored_filename, "stored file missing");
            return Err(ArchiveError::MissingFile(record.stored_filename));
        }

        let dest = target_dir.join(&record.original_filename);
        self.storage
            .retrieve_copy(&record.stored_filename, &dest)
            .map_err(|e| match e {
                FilesError::MissingFile(name) => ArchiveError::MissingFile(name),
                other => ArchiveError::Copy(other),
            })?;

        tracing::info!(key, dest = %dest.display(), "downloaded");
        Ok(dest)
    }

    /// Every record, in upload order.
    pub fn list_all(&self) -> ArchiveResult<Vec<Record>> {
        Ok(self.metadata.list_all()?)
    }

    /// The record stored under `key`, if any.
    pub fn info(&self, key: &str) -> ArchiveResult<Option<Record>> {
        Ok(self.metadata.find_by_key(key)?)
    }
}
