//! Caching forward proxy (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                   CACHE COMPOSER                      │
//!  Client         │  ┌────────┐    ┌──────────┐    ┌──────────────────┐  │
//!  ───────────────┼─▶│  http  │───▶│ routing  │───▶│    strategy      │  │
//!                 │  │ server │    │ (first   │    │ cache_first /    │  │
//!                 │  └────────┘    │  match)  │    │ network_first    │  │
//!                 │      ▲         └──────────┘    └───┬─────────┬────┘  │
//!                 │      │ passthrough                 │         │       │
//!                 │      │                             ▼         ▼       │
//!  ◀──────────────┼──────┘                     ┌─────────┐ ┌─────────┐   │
//!                 │                            │ storage │ │ network │───┼──▶ Upstream
//!                 │                            │partition│ │ client  │   │
//!                 │                            └─────────┘ └─────────┘   │
//!                 │  lifecycle: reconcile partitions before serving       │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use cache_composer::config::{load_config, ComposerConfig};
use cache_composer::network::HttpNetwork;
use cache_composer::observability::{logging, metrics};
use cache_composer::{Composer, HttpServer, MemoryStorage, Shutdown};

#[derive(Parser)]
#[command(name = "cache-composer")]
#[command(about = "Caching forward proxy driven by declarative routes", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                logging::init_logging("info");
                tracing::error!(path = %path.display(), error = %e, "Failed to load configuration");
                return Err(e.into());
            }
        },
        None => ComposerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);

    if cli.check {
        tracing::info!(routes = config.routes.len(), "Configuration is valid");
        return Ok(());
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let storage = match &config.storage.snapshot_path {
        Some(path) => MemoryStorage::load_from_file(path)?,
        None => MemoryStorage::default(),
    };
    let network = HttpNetwork::new(
        Duration::from_secs(config.upstream.timeout_secs),
        config.listener.max_body_bytes,
    );
    let composer = Composer::from_config(
        config.routes.clone(),
        Arc::new(storage.clone()),
        Arc::new(network),
    )?;

    // Stale partitions are gone before the first request is served.
    if let Err(e) = composer.activate().await {
        tracing::error!(error = %e, "Partition reconciliation failed, continuing");
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    HttpServer::new(&config, composer)
        .run(listener, shutdown.subscribe())
        .await?;

    if let Err(e) = storage.save_to_file() {
        tracing::error!(error = %e, "Failed to save cache snapshot");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
