//! # sensu-exporter
//!
//! Prometheus exporter for Sensu check results.
//!
//! Every scrape of the metrics endpoint asks the [`CheckCollector`] for
//! samples. The collector either queries the Sensu API directly or serves a
//! cached snapshot that it refreshes in the background, then maps every check
//! result onto the `sensu_check_status` gauge (1 for a passing check, 0
//! otherwise).
//!
//! ## Architecture
//!
//! ```text
//! GET /metrics ─► ExporterServer ─► ScrapeRegistry ─► CheckCollector ─► SensuClient ─► Sensu API
//!                                        ▲                  │
//!                                        └── text format ◄──┘ translate()
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use sensu_exporter::{ExporterConfig, run};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sensu_exporter::ExporterError> {
//!     let config = ExporterConfig::default()
//!         .with_api_url("http://sensu:4567")
//!         .with_cache(true);
//!     run(config, async { let _ = tokio::signal::ctrl_c().await; }).await
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod poller;
pub mod registry;
pub mod routes;
pub mod server;
pub mod source;
pub mod translate;

use std::future::Future;

use sensu_api::SensuClient;
use tracing::{info, warn};

// Re-export main types
pub use cli::Cli;
pub use collector::{CheckCollector, CollectorOptions, MetricDescriptor, CHECK_STATUS_METRIC};
pub use config::ExporterConfig;
pub use error::{ExporterError, ExporterResult};
pub use poller::spawn_poller;
pub use registry::ScrapeRegistry;
pub use server::ExporterServer;
pub use source::{FakeResponse, FakeResultSource, ResultSource};
pub use translate::{translate, CheckLabels, CheckSample, Severity};

/// Wire up the exporter from `config` and serve until `shutdown` completes.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the listen address
/// cannot be bound. Upstream failures never end the server.
pub async fn run<F>(config: ExporterConfig, shutdown: F) -> ExporterResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    config.validate()?;

    let client = SensuClient::new(config.client_config())?;
    info!(
        api = %client.results_url(),
        timeout = ?config.timeout,
        cache = config.cache_enabled,
        severity_labels = config.severity_labels,
        "configured sensu collector"
    );

    let collector = CheckCollector::new(client, config.collector_options());

    if config.poll_interval.is_some() && !config.cache_enabled {
        warn!("poll interval ignored because caching is disabled");
    }
    let poller = config
        .effective_poll_interval()
        .map(|interval| spawn_poller(collector.clone(), interval));

    let server = ExporterServer::new(ScrapeRegistry::new(collector), config.metrics_path.clone());
    let result = server.serve_with_shutdown(config.listen_addr, shutdown).await;

    if let Some(poller) = poller {
        poller.abort();
    }
    result
}
