//! Exporter HTTP server.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::error::{ExporterError, ExporterResult};
use crate::registry::ScrapeRegistry;
use crate::routes::{create_router, ExporterState};
use crate::source::ResultSource;

/// HTTP server exposing a [`ScrapeRegistry`].
#[derive(Debug)]
pub struct ExporterServer<S> {
    state: Arc<ExporterState<S>>,
}

impl<S> Clone for ExporterServer<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: ResultSource> ExporterServer<S> {
    /// Create a server for `registry`, scraped at `metrics_path`.
    pub fn new(registry: ScrapeRegistry<S>, metrics_path: impl Into<String>) -> Self {
        Self {
            state: Arc::new(ExporterState::new(registry, metrics_path)),
        }
    }

    /// Get the handler state.
    #[must_use]
    pub fn state(&self) -> Arc<ExporterState<S>> {
        Arc::clone(&self.state)
    }

    /// Start the server and listen for connections.
    ///
    /// Runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::BindFailed`] if the address cannot be bound.
    pub async fn serve(&self, addr: SocketAddr) -> ExporterResult<()> {
        self.serve_with_shutdown(addr, std::future::pending()).await
    }

    /// Start the server with graceful shutdown support.
    ///
    /// The server shuts down when `shutdown` completes.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::BindFailed`] if the address cannot be bound.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> ExporterResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ExporterError::BindFailed(addr, e))?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ExporterError::Serve`] if the server stops with an error.
    pub async fn serve_listener<F>(&self, listener: TcpListener, shutdown: F) -> ExporterResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener
            .local_addr()
            .map_err(|e| ExporterError::Serve(e.to_string()))?;
        info!(addr = %addr, path = %self.state.metrics_path(), "exporter listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ExporterError::Serve(e.to_string()))?;

        info!("exporter shut down");
        Ok(())
    }

    /// Create the router without starting the server.
    pub fn router(&self) -> axum::Router {
        create_router(self.state())
    }
}
