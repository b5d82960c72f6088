mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portal::config::Config;
use portal::state::AppState;

use crate::commands::Command;

#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(author, version, about = "Job-portal profile client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Logs go to stderr so command output on stdout stays machine-readable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Portal client v{}", env!("CARGO_PKG_VERSION"));
    info!("API base URL: {}", config.api_base_url);

    let state = AppState::from_config(config)?;
    commands::handle(&state, &cli.command).await?;

    Ok(())
}
