//! Archive key utilities.
//!
//! Every upload is addressed by a short key. The *canonical* key representation is
//! **8 lowercase hexadecimal characters**, taken from the front of a freshly generated
//! version 4 UUID.
//!
//! This crate provides:
//! - A wrapper type ([`FileKey`]) that *guarantees* the canonical format once constructed.
//! - The stored-filename derivation shared by the archive and the storage area.
//!
//! ## Canonical key form
//! - Length: 8
//! - Characters: `0-9` and `a-f` only
//! - Example: `3f9ab01c`
//!
//! Keys are short, so collisions are possible. Callers that need uniqueness must check a
//! candidate against what they already hold and draw again; see
//! [`FileKey::generate_with`] for plugging in a deterministic source in tests.
//!
//! ## Stored filenames
//! A file uploaded as `report.txt` under key `3f9ab01c` is stored as `3f9ab01c_report.txt`.

mod key;

pub use key::{FileKey, KEY_LEN};

/// Error type for key operations.
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Invalid input provided
    #[error("Invalid key: {0}")]
    InvalidInput(String),
}

/// Result type for key operations.
pub type KeyResult<T> = Result<T, KeyError>;
