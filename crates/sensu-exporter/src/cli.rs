//! Command-line argument parsing with clap.

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use clap::Parser;

use crate::config::ExporterConfig;

/// Prometheus exporter for Sensu check results.
#[derive(Parser, Debug, Clone)]
#[command(name = "sensu-exporter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Address to listen on for serving Prometheus metrics.
    #[arg(long, env = "SENSU_EXPORTER_LISTEN", default_value = ":9251", value_parser = parse_listen_addr)]
    pub listen: SocketAddr,

    /// Address of the Sensu API.
    #[arg(long, env = "SENSU_EXPORTER_API", default_value = "http://localhost:4567")]
    pub api: String,

    /// Timeout for requests to the Sensu API (e.g. `500ms`, `3s`, `1m`).
    #[arg(long, env = "SENSU_EXPORTER_TIMEOUT", default_value = "3s", value_parser = parse_duration)]
    pub timeout: Duration,

    /// Serve cached results and refresh them in the background.
    #[arg(long, env = "SENSU_EXPORTER_CACHE")]
    pub cache: bool,

    /// Add `check_message` and `check_severity` labels.
    #[arg(long, env = "SENSU_EXPORTER_SEVERITY_LABELS")]
    pub severity_labels: bool,

    /// Refresh the cache on this period between scrapes. Requires `--cache`.
    #[arg(long, env = "SENSU_EXPORTER_POLL_INTERVAL", value_parser = parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Path under which to expose metrics.
    #[arg(long, env = "SENSU_EXPORTER_METRICS_PATH", default_value = "/metrics")]
    pub metrics_path: String,
}

impl Cli {
    /// Convert the parsed arguments into an exporter configuration.
    #[must_use]
    pub fn into_config(self) -> ExporterConfig {
        ExporterConfig::new(self.listen)
            .with_api_url(self.api)
            .with_timeout(self.timeout)
            .with_cache(self.cache)
            .with_severity_labels(self.severity_labels)
            .with_poll_interval(self.poll_interval)
            .with_metrics_path(self.metrics_path)
    }
}

/// Parse a listen address. A bare `:port` binds every interface.
pub fn parse_listen_addr(value: &str) -> Result<SocketAddr, String> {
    let candidate = if value.starts_with(':') {
        format!("0.0.0.0{value}")
    } else {
        value.to_string()
    };

    candidate
        .to_socket_addrs()
        .map_err(|e| format!("invalid listen address '{value}': {e}"))?
        .next()
        .ok_or_else(|| format!("listen address '{value}' did not resolve"))
}

/// Parse a duration such as `250ms`, `3s`, `2m` or a bare number of seconds.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration '{value}'"))?;

    let seconds_per_unit = match unit {
        "ms" => return Ok(Duration::from_millis(amount)),
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        other => return Err(format!("unknown duration unit '{other}' in '{value}'")),
    };

    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{value}' is too large"))
}
