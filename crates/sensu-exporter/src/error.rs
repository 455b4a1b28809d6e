//! Error types for the exporter.

use std::net::SocketAddr;

use sensu_api::ApiError;
use thiserror::Error;

/// Result type alias for exporter operations.
pub type ExporterResult<T> = Result<T, ExporterError>;

/// Errors that can stop the exporter.
///
/// Upstream failures during a scrape are not represented here; the collector
/// absorbs them.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// Failed to bind to the specified address.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(String),

    /// A configuration value is unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The Sensu client could not be set up.
    #[error(transparent)]
    Api(#[from] ApiError),
}
