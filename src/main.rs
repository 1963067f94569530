use filestash_cli::{init_tracing, open_archive, Shell};
use std::io;

/// Main entry point for the filestash interactive session
///
/// Bootstraps the archive (storage directory and metadata log, created if absent) and runs
/// the command shell over stdin/stdout until `exit` or end of input.
///
/// # Environment Variables
/// - `FILESTASH_DATA_DIR`: Directory holding `storage/` and `file_database.csv`
///   (default: "filestash_data")
/// - `RUST_LOG`: Log filter for stderr output (default: "warn")
///
/// # Returns
/// * `Ok(())` - When the session ends normally
/// * `Err(anyhow::Error)` - If bootstrap fails, or the metadata log or terminal fails mid-session
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let service = open_archive(None)?;
    tracing::info!(
        storage = %service.storage().directory().display(),
        "starting filestash session"
    );

    let stdin = io::stdin();
    Shell::new(service, stdin.lock(), io::stdout().lock()).run()?;

    Ok(())
}
