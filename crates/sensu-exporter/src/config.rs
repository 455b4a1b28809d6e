//! Exporter configuration.

use std::net::SocketAddr;
use std::time::Duration;

use sensu_api::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT};

use crate::collector::CollectorOptions;
use crate::error::{ExporterError, ExporterResult};

/// Default listen port (the registered Sensu exporter port).
pub const DEFAULT_LISTEN_PORT: u16 = 9251;

/// Default path of the scrape endpoint.
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Configuration for the exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Address to serve metrics on.
    pub listen_addr: SocketAddr,
    /// Sensu API base URL.
    pub api_url: String,
    /// Upstream request timeout.
    pub timeout: Duration,
    /// Serve cached results and refresh them in the background.
    pub cache_enabled: bool,
    /// Attach `check_message` and `check_severity` labels.
    pub severity_labels: bool,
    /// Background refresh period. Only used with the cache enabled.
    pub poll_interval: Option<Duration>,
    /// Path of the scrape endpoint.
    pub metrics_path: String,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_LISTEN_PORT)),
            api_url: DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache_enabled: false,
            severity_labels: false,
            poll_interval: None,
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
        }
    }
}

impl ExporterConfig {
    /// Create a configuration with the specified listen address.
    #[must_use]
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            ..Self::default()
        }
    }

    /// Set the Sensu API base URL.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the upstream request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the result cache.
    #[must_use]
    pub const fn with_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Enable or disable the severity labels.
    #[must_use]
    pub const fn with_severity_labels(mut self, enabled: bool) -> Self {
        self.severity_labels = enabled;
        self
    }

    /// Set the background refresh period.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Option<Duration>) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the scrape endpoint path.
    #[must_use]
    pub fn with_metrics_path(mut self, path: impl Into<String>) -> Self {
        self.metrics_path = path.into();
        self
    }

    /// Check the configuration for unusable values.
    pub fn validate(&self) -> ExporterResult<()> {
        self.client_config().validate()?;

        if self.timeout.is_zero() {
            return Err(ExporterError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if !self.metrics_path.starts_with('/') || self.metrics_path == "/" {
            return Err(ExporterError::InvalidConfig(format!(
                "metrics path '{}' must start with '/' and not be the root",
                self.metrics_path
            )));
        }
        if self.poll_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(ExporterError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the Sensu client.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api_url.clone()).with_timeout(self.timeout)
    }

    /// Settings for the collector.
    #[must_use]
    pub const fn collector_options(&self) -> CollectorOptions {
        CollectorOptions::new()
            .with_cache(self.cache_enabled)
            .with_severity_labels(self.severity_labels)
    }

    /// The poll interval, if the poller should run.
    ///
    /// Polling only feeds the cache, so it is `None` when caching is off.
    #[must_use]
    pub const fn effective_poll_interval(&self) -> Option<Duration> {
        if self.cache_enabled { self.poll_interval } else { None }
    }
}
