//! Error types for the sensu-api crate.

use thiserror::Error;

/// Result type for Sensu API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while talking to the Sensu API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL is not a usable http(s) URL.
    #[error("invalid API url '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// The request never produced a response (refused, DNS, reset).
    #[error("request to {url} failed: {source}")]
    Transport {
        /// The request URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded the configured timeout.
    #[error("request to {url} timed out")]
    Timeout {
        /// The request URL.
        url: String,
    },

    /// The API answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status {
        /// The request URL.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body was not a JSON array of check results.
    #[error("failed to decode response from {url}: {reason}")]
    Decode {
        /// The request URL.
        url: String,
        /// Decoder message.
        reason: String,
    },
}

impl ApiError {
    /// Returns true for network-level failures, including timeouts.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }

    /// Returns true when the API responded but the response was unusable.
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Decode { .. })
    }

    /// The URL involved in the failure, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Transport { url, .. }
            | Self::Timeout { url }
            | Self::Status { url, .. }
            | Self::Decode { url, .. } => Some(url),
            Self::ClientBuild(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_status() {
        let err = ApiError::Status {
            url: "http://sensu:4567/results".to_string(),
            status: 500,
        };
        assert_eq!(err.to_string(), "http://sensu:4567/results returned HTTP 500");
    }

    #[test]
    fn error_display_timeout() {
        let err = ApiError::Timeout {
            url: "http://sensu:4567/results".to_string(),
        };
        assert_eq!(err.to_string(), "request to http://sensu:4567/results timed out");
    }

    #[test]
    fn error_display_decode() {
        let err = ApiError::Decode {
            url: "http://sensu/results".to_string(),
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert!(err.to_string().contains("failed to decode response from http://sensu/results"));
        assert!(err.to_string().contains("expected value"));
    }

    #[test]
    fn classification() {
        let timeout = ApiError::Timeout { url: "u".to_string() };
        assert!(timeout.is_transport());
        assert!(!timeout.is_protocol());

        let status = ApiError::Status { url: "u".to_string(), status: 503 };
        assert!(status.is_protocol());
        assert!(!status.is_transport());

        let decode = ApiError::Decode { url: "u".to_string(), reason: "r".to_string() };
        assert!(decode.is_protocol());

        let invalid = ApiError::InvalidUrl { url: "u".to_string(), reason: "r".to_string() };
        assert!(!invalid.is_protocol());
        assert!(!invalid.is_transport());
    }

    #[test]
    fn url_accessor() {
        let err = ApiError::Status { url: "http://a/results".to_string(), status: 404 };
        assert_eq!(err.url(), Some("http://a/results"));
    }
}
