//! The check status collector.
//!
//! [`CheckCollector`] is invoked once per scrape. It owns a single cache slot
//! behind one async mutex; every read or replacement of the slot, and every
//! synchronous upstream fetch, happens while holding that lock.
//!
//! With caching disabled each scrape fetches from the upstream, serialized
//! against concurrent scrapes. With caching enabled the first scrape fetches
//! synchronously; later scrapes are served from the cached snapshot and kick
//! off at most one background refresh at a time. The refresh fetches outside
//! the lock and only takes it to swap the snapshot in, so a slow upstream
//! never delays a scrape once the cache is populated.
//!
//! Upstream failures are logged and produce an empty sample set; they are
//! never propagated to the scrape.

use std::sync::Arc;

use sensu_api::CheckResult;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::source::ResultSource;
use crate::translate::{
    translate, CheckSample, LABEL_CHECK_MESSAGE, LABEL_CHECK_NAME, LABEL_CHECK_SEVERITY,
    LABEL_CLIENT,
};

/// Name of the exported gauge.
pub const CHECK_STATUS_METRIC: &str = "sensu_check_status";

/// Help text of the exported gauge.
pub const CHECK_STATUS_HELP: &str = "Sensu Check Status(1:Up, 0:Down)";

const BASE_LABELS: &[&str] = &[LABEL_CLIENT, LABEL_CHECK_NAME];
const SEVERITY_LABELS: &[&str] = &[
    LABEL_CLIENT,
    LABEL_CHECK_NAME,
    LABEL_CHECK_MESSAGE,
    LABEL_CHECK_SEVERITY,
];

/// Static description of a metric family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDescriptor {
    /// Metric name.
    pub name: &'static str,
    /// Help text.
    pub help: &'static str,
    /// Label names, in the order samples carry them.
    pub label_names: &'static [&'static str],
}

/// Behaviour toggles for a [`CheckCollector`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectorOptions {
    /// Serve cached results and refresh them in the background.
    pub cache_enabled: bool,
    /// Attach `check_message` and `check_severity` labels.
    pub severity_labels: bool,
}

impl CollectorOptions {
    /// Options with caching and severity labels disabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cache_enabled: false,
            severity_labels: false,
        }
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
}

/// The lock-guarded cache slot.
#[derive(Debug, Default)]
struct CacheSlot {
    /// Last successfully fetched results. Replaced wholesale.
    snapshot: Option<Arc<Vec<CheckResult>>>,
    /// A refresh is in flight.
    refreshing: bool,
}

/// Scrape-time collector of Sensu check statuses.
///
/// Cloning yields another handle to the same cache slot.
#[derive(Debug)]
pub struct CheckCollector<S> {
    source: Arc<S>,
    slot: Arc<Mutex<CacheSlot>>,
    options: CollectorOptions,
}

impl<S> Clone for CheckCollector<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            slot: Arc::clone(&self.slot),
            options: self.options,
        }
    }
}

impl<S: ResultSource> CheckCollector<S> {
    /// Creates a collector reading from `source`.
    pub fn new(source: S, options: CollectorOptions) -> Self {
        Self {
            source: Arc::new(source),
            slot: Arc::new(Mutex::new(CacheSlot::default())),
            options,
        }
    }

    /// The options this collector was built with.
    #[must_use]
    pub const fn options(&self) -> CollectorOptions {
        self.options
    }

    /// The underlying result source.
    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Descriptors of every metric this collector can emit.
    ///
    /// Always a single descriptor; its label names depend only on the
    /// options, which are fixed at construction.
    #[must_use]
    pub fn describe(&self) -> Vec<MetricDescriptor> {
        let label_names = if self.options.severity_labels {
            SEVERITY_LABELS
        } else {
            BASE_LABELS
        };
        vec![MetricDescriptor {
            name: CHECK_STATUS_METRIC,
            help: CHECK_STATUS_HELP,
            label_names,
        }]
    }

    /// Produce one sample per check result for the current scrape.
    pub async fn collect(&self) -> Vec<CheckSample> {
        let results = self.current_results().await;
        let severity_labels = self.options.severity_labels;

        let samples: Vec<_> = results
            .iter()
            .map(|result| translate(result, severity_labels))
            .collect();
        debug!(samples = samples.len(), "collected check samples");
        samples
    }

    /// Run a refresh cycle now unless one is already in flight.
    ///
    /// The cycle runs on its own task, so dropping this future does not
    /// abandon it with the in-flight flag still set. Returns `true` if this
    /// call started the refresh.
    pub async fn refresh(&self) -> bool {
        {
            let mut slot = self.slot.lock().await;
            if slot.refreshing {
                return false;
            }
            slot.refreshing = true;
        }
        if let Err(e) = self.spawn_refresh().await {
            warn!(error = %e, "cache refresh task failed");
            self.slot.lock().await.refreshing = false;
        }
        true
    }

    /// Whether a snapshot is cached.
    pub async fn is_cached(&self) -> bool {
        self.slot.lock().await.snapshot.is_some()
    }

    /// Choose the result set for this scrape.
    async fn current_results(&self) -> Arc<Vec<CheckResult>> {
        let mut slot = self.slot.lock().await;

        if !self.options.cache_enabled {
            // Fetch while holding the lock so concurrent scrapes never race
            // each other against the upstream.
            let results = self.fetch_or_empty().await;
            drop(slot);
            return Arc::new(results);
        }

        if let Some(snapshot) = slot.snapshot.clone() {
            if !slot.refreshing {
                slot.refreshing = true;
                drop(self.spawn_refresh());
            }
            return snapshot;
        }

        match self.source.fetch_results().await {
            Ok(results) => {
                let snapshot = Arc::new(results);
                slot.snapshot = Some(Arc::clone(&snapshot));
                snapshot
            }
            Err(e) => {
                warn!(url = %self.source.endpoint(), error = %e, "query sensu failed");
                Arc::new(Vec::new())
            }
        }
    }

    async fn fetch_or_empty(&self) -> Vec<CheckResult> {
        self.source.fetch_results().await.unwrap_or_else(|e| {
            warn!(url = %self.source.endpoint(), error = %e, "query sensu failed");
            Vec::new()
        })
    }

    /// Spawn the background refresh. The caller has already set `refreshing`.
    fn spawn_refresh(&self) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let slot = Arc::clone(&self.slot);
        tokio::spawn(async move {
            refresh_slot(source.as_ref(), &slot).await;
        })
    }
}

/// Refresh the slot and clear the in-flight flag.
///
/// A populated slot is fetched for without the lock and only locked for the
/// swap. An empty slot is fetched for under the lock, so scrapes arriving
/// meanwhile wait for this result instead of issuing their own fetch.
async fn refresh_slot<S: ResultSource>(source: &S, slot: &Mutex<CacheSlot>) {
    debug!(url = %source.endpoint(), "refreshing cached results");

    let mut guard = slot.lock().await;
    if guard.snapshot.is_none() {
        let fetched = source.fetch_results().await;
        apply_refresh(source, &mut guard, fetched);
        return;
    }
    drop(guard);

    let fetched = source.fetch_results().await;
    apply_refresh(source, &mut *slot.lock().await, fetched);
}

fn apply_refresh<S: ResultSource>(
    source: &S,
    slot: &mut CacheSlot,
    fetched: sensu_api::Result<Vec<CheckResult>>,
) {
    match fetched {
        Ok(results) => {
            debug!(results = results.len(), "cache refreshed");
            slot.snapshot = Some(Arc::new(results));
        }
        Err(e) => {
            warn!(url = %source.endpoint(), error = %e, "cache refresh failed, keeping previous results");
        }
    }
    slot.refreshing = false;
}
