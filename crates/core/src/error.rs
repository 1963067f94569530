use std::path::PathBuf;

use filestash_files::FilesError;

/// Failures of the metadata log itself.
///
/// These are never turned into a user-facing "failed" result; they propagate and end the
/// session.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("failed to create metadata directory: {0}")]
    DirCreation(std::io::Error),
    #[error("failed to open metadata log: {0}")]
    Open(std::io::Error),
    #[error("failed to write metadata log: {0}")]
    Write(csv::Error),
    #[error("failed to flush metadata log: {0}")]
    Flush(std::io::Error),
    #[error("failed to read metadata log: {0}")]
    Read(csv::Error),
}

pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("Source file does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("Source file name is not valid UTF-8: {}", .0.display())]
    InvalidFilename(PathBuf),
    #[error("Failed to copy file: {0}")]
    Copy(#[source] FilesError),
    #[error("Invalid key: {0}")]
    InvalidKey(String),
    #[error("File missing in storage: {0}")]
    MissingFile(String),
    #[error("Recorded file name is not a plain file name: {0}")]
    UnsafeFilename(String),
    #[error("failed to allocate an unused key after {0} attempts")]
    KeyExhausted(usize),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to prepare storage area: {0}")]
    StorageSetup(#[source] FilesError),
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

impl ArchiveError {
    /// True for failures reported to the user as a single line while the session carries on.
    ///
    /// Metadata log, configuration and storage setup failures are not recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ArchiveError::SourceNotFound(_)
                | ArchiveError::InvalidFilename(_)
                | ArchiveError::Copy(_)
                | ArchiveError::InvalidKey(_)
                | ArchiveError::MissingFile(_)
                | ArchiveError::UnsafeFilename(_)
                | ArchiveError::KeyExhausted(_)
        )
    }
}

pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;
