//! HTTP client for the Sensu results endpoint.

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::error::{ApiError, Result};
use crate::types::CheckResult;

/// Default Sensu API base URL.
pub const DEFAULT_API_URL: &str = "http://localhost:4567";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Path of the results endpoint, relative to the base URL.
pub const RESULTS_PATH: &str = "/results";

/// Configuration for [`SensuClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the Sensu API, e.g. `http://sensu:4567`.
    pub base_url: String,
    /// Upper bound for a single request, connect included.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration for the given base URL with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the results endpoint.
    #[must_use]
    pub fn results_url(&self) -> String {
        format!("{}{RESULTS_PATH}", self.base_url.trim_end_matches('/'))
    }

    /// Check that the base URL is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let parsed = Url::parse(&self.base_url).map_err(|e| ApiError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;

        match parsed.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ApiError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme '{other}'"),
            }),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Stateless client for `GET {base_url}/results`.
///
/// Each call issues a single request bounded by the configured timeout. There
/// is no retry and no caching at this layer.
#[derive(Debug, Clone)]
pub struct SensuClient {
    http: reqwest::Client,
    results_url: String,
}

impl SensuClient {
    /// Create a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the base URL is not http(s), or
    /// [`ApiError::ClientBuild`] if the underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::ClientBuild)?;

        Ok(Self {
            http,
            results_url: config.results_url(),
        })
    }

    /// The URL every fetch is sent to.
    #[must_use]
    pub fn results_url(&self) -> &str {
        &self.results_url
    }

    /// Fetch the current check results, preserving upstream order.
    ///
    /// An empty JSON array yields an empty vector.
    ///
    /// # Errors
    ///
    /// Returns a transport error ([`ApiError::Transport`], [`ApiError::Timeout`])
    /// when no response arrives, or a protocol error ([`ApiError::Status`],
    /// [`ApiError::Decode`]) when the response is unusable.
    pub async fn fetch_results(&self) -> Result<Vec<CheckResult>> {
        let url = &self.results_url;
        debug!(url = %url, "querying sensu api");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        let results: Vec<CheckResult> =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        debug!(url = %url, results = results.len(), "sensu api responded");
        Ok(results)
    }

    fn transport_error(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                url: self.results_url.clone(),
            }
        } else {
            ApiError::Transport {
                url: self.results_url.clone(),
                source: err,
            }
        }
    }
}
