//! HTTP routes of the exporter.

use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, Router};
use tower_http::trace::TraceLayer;

use crate::registry::{ScrapeRegistry, CONTENT_TYPE};
use crate::source::ResultSource;

/// Shared state for the HTTP handlers.
#[derive(Debug)]
pub struct ExporterState<S> {
    registry: ScrapeRegistry<S>,
    metrics_path: String,
}

impl<S: ResultSource> ExporterState<S> {
    /// Create the handler state.
    pub fn new(registry: ScrapeRegistry<S>, metrics_path: impl Into<String>) -> Self {
        Self {
            registry,
            metrics_path: metrics_path.into(),
        }
    }

    /// The scrape registry.
    #[must_use]
    pub const fn registry(&self) -> &ScrapeRegistry<S> {
        &self.registry
    }

    /// Path of the scrape endpoint.
    #[must_use]
    pub fn metrics_path(&self) -> &str {
        &self.metrics_path
    }
}

/// Create the exporter router.
///
/// | Endpoint | Description |
/// |----------|-------------|
/// | `GET {metrics_path}` | Prometheus text exposition, always 200 |
/// | `GET /` | The metrics path as plain text |
pub fn create_router<S: ResultSource>(state: Arc<ExporterState<S>>) -> Router {
    let metrics_path = state.metrics_path().to_string();

    Router::new()
        .route(&metrics_path, get(metrics::<S>))
        .route("/", get(root::<S>))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Handle GET {metrics_path}.
async fn metrics<S: ResultSource>(State(state): State<Arc<ExporterState<S>>>) -> Response {
    let body = state.registry.gather().await;
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}

/// Handle GET / - points at the scrape endpoint.
async fn root<S: ResultSource>(State(state): State<Arc<ExporterState<S>>>) -> String {
    state.metrics_path.clone()
}
