//! # filestash core
//!
//! Core logic for the filestash archive:
//! - [`MetadataStore`]: the append-only CSV log mapping keys to stored files
//! - [`ArchiveService`]: upload/download orchestration and key allocation
//! - [`ArchiveConfig`]: storage and log locations, resolved once at startup
//!
//! **No shell concerns**: prompting, command dispatch and output formatting belong in
//! `filestash-cli`.

pub mod archive;
pub mod config;
pub mod constants;
mod error;
pub mod metadata;

pub use archive::ArchiveService;
pub use config::{resolve_data_dir, ArchiveConfig};
pub use error::{ArchiveError, ArchiveResult, MetadataError, MetadataResult};
pub use filestash_key::FileKey;
pub use metadata::{MetadataStore, Record, Records};
