//! Prometheus text exposition of collector samples.
//!
//! A fresh `prometheus-client` registry is assembled for every scrape from the
//! collector's descriptors and samples, so checks that vanish upstream also
//! vanish from the output instead of lingering with a stale value.

use std::sync::atomic::AtomicU64;

use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tracing::error;

use crate::collector::CheckCollector;
use crate::source::ResultSource;
use crate::translate::CheckSample;

/// Label set as ordered `(name, value)` pairs.
type LabelPairs = Vec<(String, String)>;

/// Gauge family keyed by label pairs.
type GaugeFamily = Family<LabelPairs, Gauge<f64, AtomicU64>>;

/// Content-Type of the exposition output.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Renders a [`CheckCollector`] in the Prometheus text format.
///
/// Built once at startup and shared with the HTTP server.
#[derive(Debug)]
pub struct ScrapeRegistry<S> {
    collector: CheckCollector<S>,
}

impl<S: ResultSource> ScrapeRegistry<S> {
    /// Creates a registry around `collector`.
    pub const fn new(collector: CheckCollector<S>) -> Self {
        Self { collector }
    }

    /// The registered collector.
    #[must_use]
    pub const fn collector(&self) -> &CheckCollector<S> {
        &self.collector
    }

    /// Collect and encode all metrics.
    ///
    /// Never fails: an encoding error is logged and yields an empty document.
    pub async fn gather(&self) -> String {
        let samples = self.collector.collect().await;
        self.encode_samples(&samples)
    }

    fn encode_samples(&self, samples: &[CheckSample]) -> String {
        let mut registry = Registry::default();

        for descriptor in self.collector.describe() {
            let family = GaugeFamily::default();
            for sample in samples {
                family.get_or_create(&escaped_pairs(sample)).set(sample.value);
            }
            registry.register(descriptor.name, descriptor.help, family);
        }

        let mut buffer = String::new();
        if let Err(e) = encode(&mut buffer, &registry) {
            error!(error = %e, "failed to encode prometheus metrics");
            return String::new();
        }
        buffer
    }

    /// Returns the Content-Type header value for the exposition output.
    #[must_use]
    pub const fn content_type() -> &'static str {
        CONTENT_TYPE
    }
}

/// Label pairs of `sample` with every value escaped for the text format.
///
/// The encoder writes label values verbatim, so a quote, backslash or line
/// break in check output would otherwise end the value early.
fn escaped_pairs(sample: &CheckSample) -> LabelPairs {
    sample
        .labels
        .pairs()
        .into_iter()
        .map(|(name, value)| (name, escape_label_value(&value)))
        .collect()
}

/// Escape `\`, `"` and newlines as required inside a quoted label value.
fn escape_label_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}
