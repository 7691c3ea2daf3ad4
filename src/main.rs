use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use msgvault::cli::{handle_command, Commands};
use msgvault::config::{paths::VaultPaths, settings::Settings};

#[derive(Parser)]
#[command(
    name = "msgvault",
    author = "Kaylee Beyene",
    version,
    about = "Portable backup and restore for text messages, call history, and contacts",
    long_about = "msgvault captures text messages, call history, and contacts into a \
                  single portable snapshot file, and replays snapshots back into the \
                  stores with best-effort, per-record fault tolerance."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("msgvault=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = VaultPaths::new()?;
    paths.ensure_directories()?;
    let settings = Settings::load_or_create(&paths)?;

    handle_command(&paths, &settings, cli.command)?;

    Ok(())
}
