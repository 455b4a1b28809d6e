//! sensu-exporter binary.
//!
//! Serves Sensu check results as Prometheus metrics.

use anyhow::Context;
use clap::Parser;
use sensu_exporter::{run, Cli};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Cli::parse().into_config();
    info!("Starting sensu-exporter on {}", config.listen_addr);
    info!("  Sensu API:        {}", config.api_url);
    info!("  Metrics endpoint: http://{}{}", config.listen_addr, config.metrics_path);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        info!("shutdown signal received");
    };

    run(config, shutdown).await.context("sensu-exporter failed")
}
