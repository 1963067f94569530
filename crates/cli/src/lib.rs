//! # filestash CLI
//!
//! The command shell in front of [`ArchiveService`]:
//! - [`shell`]: the dispatch table, prompt collection and the interactive session loop
//! - [`render`]: the lines printed for each result
//!
//! Both the interactive session and the one-shot `stash` subcommands go through the same
//! dispatch table, so they print identical output.

pub mod render;
pub mod shell;

use filestash_core::{resolve_data_dir, ArchiveConfig, ArchiveError, ArchiveService};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use shell::{Flow, Inputs, Shell};

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "FILESTASH_DATA_DIR";

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("Invalid command! Try: {}", shell::command_names().join(" | "))]
    InvalidCommand(String),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type ShellResult<T> = std::result::Result<T, ShellError>;

/// Installs the stderr log subscriber, filtered by `RUST_LOG` (default `warn`).
///
/// Logs go to stderr so they never interleave with shell output on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolves the data directory and bootstraps the archive in it.
///
/// `data_dir` is the command-line override; when absent, [`DATA_DIR_ENV`] is consulted.
pub fn open_archive(data_dir: Option<PathBuf>) -> anyhow::Result<ArchiveService> {
    let data_dir = data_dir.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from));
    let data_dir = resolve_data_dir(data_dir)?;
    let config = ArchiveConfig::from_data_dir(&data_dir);
    Ok(ArchiveService::open(&config)?)
}
