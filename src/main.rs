use std::fs::File;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod completion;
mod config;
mod session;
mod ui;

use crate::app::App;
use crate::config::Config;

#[derive(Parser)]
#[command(name = "palaver")]
#[command(version)]
#[command(about = "Chat with a completion backend from the terminal", long_about = None)]
struct Cli {
    /// Base URL of the completion backend (overrides the config file)
    #[arg(long)]
    backend_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }

    init_tracing(&config)?;
    tracing::info!(backend_url = %config.backend_url, "starting session");

    let mut app = App::new(&config)?;
    app.run().await
}

/// Route diagnostics to a log file; writing to the terminal would corrupt
/// the TUI.
fn init_tracing(config: &Config) -> Result<()> {
    let log_file = File::create(config.log_path()).context("Failed to open log file")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    Ok(())
}
