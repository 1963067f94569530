//! Append-only metadata log.
//!
//! The log is a CSV file with one header row followed by one row per upload:
//!
//! ```text
//! key,original_filename,stored_filename,upload_timestamp
//! 3f9ab01c,report.txt,3f9ab01c_report.txt,2026-10-17 09:14:03
//! ```
//!
//! Rows are only ever appended. Lookup is a linear scan in file order and the first matching
//! row wins, so no index has to be kept in sync with the file.
//!
//! # Concurrency
//!
//! Nothing here serializes writers. Two processes appending at once can interleave rows, and
//! key allocation in [`ArchiveService`](crate::ArchiveService) reads the log before it
//! appends. Making that safe needs an exclusive advisory lock on the log held across the
//! read-then-append in `ArchiveService::upload`, and a shared lock around [`MetadataStore::records`].

use crate::constants::{METADATA_HEADER, TIMESTAMP_FORMAT};
use crate::{MetadataError, MetadataResult};
use chrono::{DateTime, Utc};
use filestash_key::FileKey;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

/// One row of the metadata log.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Record {
    pub key: FileKey,
    /// Base name of the uploaded file, exactly as it was on the source path.
    pub original_filename: String,
    /// `<key>_<original_filename>`, the name inside the storage area.
    pub stored_filename: String,
    #[serde(with = "upload_timestamp")]
    pub upload_timestamp: DateTime<Utc>,
}

impl Record {
    /// Builds the record for an upload of `original_filename` under `key`.
    pub fn new(key: FileKey, original_filename: &str, upload_timestamp: DateTime<Utc>) -> Self {
        Self {
            stored_filename: key.stored_filename(original_filename),
            key,
            original_filename: original_filename.to_owned(),
            upload_timestamp,
        }
    }

    /// Field name/value pairs in log column order.
    pub fn fields(&self) -> [(&'static str, String); 4] {
        [
            (METADATA_HEADER[0], self.key.to_string()),
            (METADATA_HEADER[1], self.original_filename.clone()),
            (METADATA_HEADER[2], self.stored_filename.clone()),
            (
                METADATA_HEADER[3],
                self.upload_timestamp.format(TIMESTAMP_FORMAT).to_string(),
            ),
        ]
    }
}

mod upload_timestamp {
    use crate::constants::TIMESTAMP_FORMAT;
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// Handle on the metadata log file.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    /// Creates a handle on the log at `path`. Performs no I/O.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Makes sure the log exists and starts with the header row.
    ///
    /// Creates missing parent directories. A log that already has content is left alone, so
    /// this is safe to call on every startup. An existing but empty file gets the header.
    pub fn initialize(&self) -> MetadataResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(MetadataError::DirCreation)?;
        }

        let file = self.open_for_append(true)?;
        let is_empty = file.metadata().map_err(MetadataError::Open)?.len() == 0;
        if is_empty {
            let mut writer = writer_for(file);
            writer
                .write_record(METADATA_HEADER)
                .map_err(MetadataError::Write)?;
            writer.flush().map_err(MetadataError::Flush)?;
            tracing::info!(path = %self.path.display(), "created metadata log");
        }

        Ok(())
    }

    /// Appends one row to the end of the log.
    ///
    /// No uniqueness check is made. The log must already be initialized.
    pub fn append(&self, record: &Record) -> MetadataResult<()> {
        let mut writer = writer_for(self.open_for_append(false)?);
        writer.serialize(record).map_err(MetadataError::Write)?;
        writer.flush().map_err(MetadataError::Flush)?;
        tracing::debug!(key = %record.key, "appended metadata record");
        Ok(())
    }

    /// Streams every record in file order.
    ///
    /// The iterator is one-shot; call again to rescan.
    pub fn records(&self) -> MetadataResult<Records> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .map_err(MetadataError::Read)?;
        Ok(Records {
            inner: reader.into_deserialize(),
        })
    }

    /// Returns the first record whose key equals `key` exactly.
    pub fn find_by_key(&self, key: &str) -> MetadataResult<Option<Record>> {
        for record in self.records()? {
            let record = record?;
            if record.key.as_str() == key {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    /// Every record in file order (insertion order).
    pub fn list_all(&self) -> MetadataResult<Vec<Record>> {
        self.records()?.collect()
    }

    fn open_for_append(&self, create: bool) -> MetadataResult<File> {
        OpenOptions::new()
            .create(create)
            .append(true)
            .open(&self.path)
            .map_err(MetadataError::Open)
    }
}

fn writer_for(file: File) -> csv::Writer<File> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file)
}

/// One-shot iterator over the rows of the log.
pub struct Records {
    inner: csv::DeserializeRecordsIntoIter<File, Record>,
}

impl Iterator for Records {
    type Item = MetadataResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|row| row.map_err(MetadataError::Read))
    }
}
