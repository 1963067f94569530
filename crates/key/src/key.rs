//! Internal implementation of archive keys.

use crate::{KeyError, KeyResult};
use std::{fmt, str::FromStr};
use uuid::Uuid;

/// Number of hex characters in a canonical key.
pub const KEY_LEN: usize = 8;

/// Canonical archive key (8 lowercase hex characters).
///
/// Once constructed, the contained string is guaranteed to be canonical, so it is safe to
/// splice into a stored filename.
///
/// # Construction
/// - [`FileKey::generate`] draws a fresh key from a random UUID.
/// - [`FileKey::parse`] validates an externally supplied key (CLI input, log row).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileKey(String);

impl FileKey {
    /// Generates a new random key.
    ///
    /// The key is the first [`KEY_LEN`] characters of the simple (unhyphenated) form of a
    /// version 4 UUID. No uniqueness check is made here.
    pub fn generate() -> Self {
        Self::generate_with(Uuid::new_v4)
    }

    /// Generates a key from the UUID returned by `source`.
    ///
    /// # Arguments
    ///
    /// * `source` - Produces the 128-bit value the key is truncated from.
    pub fn generate_with(source: impl FnOnce() -> Uuid) -> Self {
        let simple = source().simple().to_string();
        Self(simple[..KEY_LEN].to_owned())
    }

    /// Validates and wraps a key that must already be in canonical form.
    ///
    /// Uppercase input is rejected rather than normalised, because lookup is an exact string
    /// comparison against the log.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> KeyResult<Self> {
        if Self::is_canonical(input) {
            return Ok(Self(input.to_owned()));
        }
        Err(KeyError::InvalidInput(format!(
            "key must be {} lowercase hex characters, got: '{}'",
            KEY_LEN, input
        )))
    }

    /// Returns true if `input` is a canonical key.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == KEY_LEN
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the on-disk name for `original_filename` stored under this key.
    ///
    /// Format: `<key>_<original_filename>`.
    pub fn stored_filename(&self, original_filename: &str) -> String {
        format!("{}_{}", self.0, original_filename)
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FileKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FileKey::parse(s)
    }
}

impl AsRef<str> for FileKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FileKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for FileKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        FileKey::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_is_canonical() {
        for _ in 0..100 {
            let key = FileKey::generate();
            assert!(FileKey::is_canonical(key.as_str()), "not canonical: {key}");
        }
    }

    #[test]
    fn test_generate_with_truncates_uuid() {
        let uuid = Uuid::parse_str("550e8400e29b41d4a716446655440000").unwrap();
        let key = FileKey::generate_with(|| uuid);

        assert_eq!(key.as_str(), "550e8400");
    }

    #[test]
    fn test_generate_produces_distinct_keys() {
        let a = FileKey::generate();
        let b = FileKey::generate();

        assert_ne!(a, b);
    }

    #[test]
    fn test_parse_valid() {
        let key = FileKey::parse("3f9ab01c").unwrap();
        assert_eq!(key.to_string(), "3f9ab01c");
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        let result = FileKey::parse("3F9AB01C");
        assert!(matches!(result, Err(KeyError::InvalidInput(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(FileKey::parse("3f9ab01").is_err());
        assert!(FileKey::parse("3f9ab01c0").is_err());
        assert!(FileKey::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let result = FileKey::parse("3f9ab01g");
        match result {
            Err(KeyError::InvalidInput(msg)) => assert!(msg.contains("3f9ab01g")),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_from_str_matches_parse() {
        let key: FileKey = "deadbeef".parse().unwrap();
        assert_eq!(key, FileKey::parse("deadbeef").unwrap());
    }

    #[test]
    fn test_stored_filename() {
        let key = FileKey::parse("3f9ab01c").unwrap();
        assert_eq!(key.stored_filename("report.txt"), "3f9ab01c_report.txt");
        assert_eq!(
            key.stored_filename("my notes, v2.txt"),
            "3f9ab01c_my notes, v2.txt"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_rejects_non_canonical() {
        let ok: FileKey = serde_json::from_str("\"0a1b2c3d\"").unwrap();
        assert_eq!(ok.as_str(), "0a1b2c3d");

        let bad: Result<FileKey, _> = serde_json::from_str("\"not-a-key\"");
        assert!(bad.is_err());
    }
}
