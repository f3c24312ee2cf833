//! Discord REST relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────┐
//!                          │                     RELAY                        │
//!   Client Request         │  ┌─────────┐    ┌────────────┐    ┌───────────┐  │
//!   ───────────────────────┼─▶│  http   │───▶│ translator │───▶│  upstream │──┼──▶ Discord API
//!                          │  │ server  │    │ (ids, auth,│    │  client   │  │
//!                          │  └─────────┘    │ pagination)│    └─────┬─────┘  │
//!                          │                 └────────────┘          │        │
//!   Client Response        │  ┌─────────┐    ┌────────────┐          │        │
//!   ◀──────────────────────┼──│response │◀───│ normalizer │◀─────────┘        │
//!                          │  │ render  │    │ (errors,   │                   │
//!                          │  └─────────┘    │ next_page) │                   │
//!                          │                 └────────────┘                   │
//!                          │  config · security · observability · lifecycle   │
//!                          └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use discord_relay::config::{load_config, validation::validate_config, ConfigError};
use discord_relay::lifecycle;
use discord_relay::observability::logging;

#[derive(Parser)]
#[command(name = "discord-relay")]
#[command(about = "Pagination-normalizing relay in front of the Discord REST API", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // A missing .env file is normal in production.
    let _ = dotenvy::dotenv();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("discord-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        credential_mode = ?config.credentials.mode,
        upstream_timeout_secs = config.upstream.request_timeout_secs,
        "Configuration loaded"
    );

    if args.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
