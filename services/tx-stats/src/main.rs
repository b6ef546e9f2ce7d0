//! Transaction Statistics Service - Main Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tx_stats::{TxStatsConfig, start_server};

const DEFAULT_CONFIG_PATH: &str = "tx-stats.toml";

/// Rolling sales statistics over the trailing window
#[derive(Debug, Parser)]
#[command(name = "tx-stats", version, about)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tx_stats=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // An absent file yields defaults; a malformed or invalid one is fatal
    let mut config = TxStatsConfig::from_file(&cli.config).map_err(|e| {
        error!("Failed to load config from {}: {}", cli.config, e);
        e
    })?;
    info!("Loaded configuration from: {}", cli.config);
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    info!(
        "Starting transaction statistics service v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!("Server will bind to: {}", config.server_address());
    info!(
        "Window: {}s, retention: {}s",
        config.window.seconds_to_buffer, config.window.cleanup_after_secs
    );

    if let Err(e) = start_server(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
