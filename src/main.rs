//! Pilot Catalog - frame availability and media catalog API
//!
//! Serves read-only views over object storage: which recent days hold a
//! usable volume of captured frames for a device, which rendered videos and
//! test reports are published, and which models can be applied to a report.

mod catalog;
mod config;
mod errors;
mod identifier;
mod metrics;
mod routes;
mod scan;
mod server;
mod storage;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::AppState;
use crate::server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment and optional config file
    let config = Config::from_env().context("failed to load configuration")?;

    // Initialize tracing with JSON output for structured logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Initialize Prometheus metrics
    crate::metrics::init_metrics().context("failed to register metrics")?;

    info!("Starting Pilot Catalog");
    info!(?config, "Configuration loaded");

    // Initialize storage backend based on configuration
    let storage = storage::create_backend(&config).context("failed to initialize storage")?;
    info!(backend = ?config.backend.backend_type, "Storage backend initialized");

    // Create and start the HTTP server
    let server = Server::new(config.clone(), AppState::new(storage, config.clone()));

    // Handle graceful shutdown
    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("Received shutdown signal");
    };

    info!("Server starting on {}", config.server.bind_address);
    if let Err(e) = server.start(shutdown_signal).await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
