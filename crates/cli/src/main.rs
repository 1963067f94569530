use clap::{Parser, Subcommand};
use filestash_cli::shell::{self, Inputs};
use filestash_cli::{init_tracing, open_archive, Shell};
use filestash_core::constants::DEFAULT_DOWNLOAD_DIR;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stash")]
#[command(about = "Local file archive addressed by short keys")]
struct Cli {
    /// Data directory holding storage/ and file_database.csv (overrides FILESTASH_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy a file into the archive and print its key
    Upload {
        /// File to archive (must be valid UTF-8)
        path: String,
    },
    /// Copy an archived file out by key
    Download {
        /// Key printed at upload time
        key: String,
        /// Destination directory
        #[arg(long = "to", default_value = DEFAULT_DOWNLOAD_DIR)]
        target_dir: String,
    },
    /// List every archived file
    List,
    /// Show the record for one key
    Info {
        /// Key printed at upload time
        key: String,
    },
    /// Start the interactive shell (the default)
    Shell,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let service = open_archive(cli.data_dir)?;

    let (name, inputs): (&str, Inputs) = match cli.command {
        Some(Commands::Upload { path }) => ("upload", [path].into_iter().collect()),
        Some(Commands::Download { key, target_dir }) => {
            ("download", [key, target_dir].into_iter().collect())
        }
        Some(Commands::List) => ("list", Inputs::default()),
        Some(Commands::Info { key }) => ("info", [key].into_iter().collect()),
        Some(Commands::Shell) | None => {
            let stdin = io::stdin();
            Shell::new(service, stdin.lock(), io::stdout().lock()).run()?;
            return Ok(());
        }
    };

    let mut stdout = io::stdout().lock();
    shell::dispatch(&service, name, &inputs, &mut stdout)?;
    stdout.flush()?;

    Ok(())
}
