//! HBNB object console.
//!
//! Reads commands from stdin, one per line. When stdin is a terminal the
//! `(hbnb) ` prompt is shown; piped input runs without it:
//!
//! ```bash
//! echo "create User" | cargo run -p hbnb -- --file objects.json
//! ```

use anyhow::Context;
use clap::Parser;
use hbnb_core::{Console, FileStorage, StorageConfig};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// HBNB - create, show, update and destroy stored objects
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file backing the object store (overrides HBNB_FILE_PATH)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = StorageConfig::from_env();
    if let Some(path) = args.file {
        config = config.with_path(path);
    }

    let path = config.path().to_path_buf();
    let mut storage = FileStorage::new(config);
    let loaded = storage
        .reload()
        .with_context(|| format!("failed to load {}", path.display()))?;
    tracing::debug!(entries = loaded, path = %path.display(), "storage ready");

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut console = Console::new(storage, io::stdout());
    console.run(stdin.lock(), interactive)?;

    Ok(())
}

/// Log to stderr so diagnostics never mix with console output.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(io::stderr)
        .init();
}
