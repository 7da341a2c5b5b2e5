//! ShellQuest entry point.
//!
//! ```bash
//! cargo run -p shellquest-repl -- --remote-dir /tmp/shellquest-cloud
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shellquest_repl::ReplConfig;

#[derive(Parser)]
#[command(name = "shellquest")]
#[command(about = "Learn the command line in a simulated shell")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for the local save and history
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory shared between devices as the cloud backend
    #[arg(long)]
    remote_dir: Option<PathBuf>,

    /// Start with the cloud unreachable
    #[arg(long)]
    offline: bool,
}

impl Cli {
    fn into_config(self) -> Result<ReplConfig> {
        let mut config = match &self.config {
            Some(path) => ReplConfig::load_from(path)?,
            None => ReplConfig::load()?,
        };
        if self.data_dir.is_some() {
            config.data_dir = self.data_dir;
        }
        if self.remote_dir.is_some() {
            config.remote_dir = self.remote_dir;
        }
        config.offline |= self.offline;
        Ok(config)
    }
}

fn main() -> Result<()> {
    // stdout belongs to the game; logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("shellquest=warn")),
        )
        .init();

    let config = Cli::parse().into_config()?;
    shellquest_repl::run(config)
}
