//! Where the collector gets its check results from.
//!
//! [`ResultSource`] is implemented by [`SensuClient`] for production use and
//! by [`FakeResultSource`] for tests.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sensu_api::{ApiError, CheckResult, SensuClient};

/// A provider of check result snapshots.
pub trait ResultSource: Send + Sync + 'static {
    /// Fetch the current results.
    fn fetch_results(
        &self,
    ) -> impl Future<Output = sensu_api::Result<Vec<CheckResult>>> + Send;

    /// Human-readable location of the source, for logs.
    fn endpoint(&self) -> &str;
}

impl ResultSource for SensuClient {
    async fn fetch_results(&self) -> sensu_api::Result<Vec<CheckResult>> {
        SensuClient::fetch_results(self).await
    }

    fn endpoint(&self) -> &str {
        self.results_url()
    }
}

/// Scripted outcome of a fake fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeResponse {
    /// Succeed with these results.
    Results(Vec<CheckResult>),
    /// Fail as if the API returned this HTTP status.
    Status(u16),
    /// Fail as if the response body could not be decoded.
    Malformed,
}

#[derive(Debug)]
struct FakeState {
    queued: VecDeque<FakeResponse>,
    fallback: FakeResponse,
    delay: Option<Duration>,
}

/// A fake result source for testing.
///
/// Queued responses are served first, in order; afterwards the fallback
/// response is repeated. Clones share state.
#[derive(Debug, Clone)]
pub struct FakeResultSource {
    state: Arc<Mutex<FakeState>>,
    calls: Arc<AtomicUsize>,
}

const FAKE_ENDPOINT: &str = "fake://sensu/results";

impl FakeResultSource {
    /// Creates a fake that always returns `results`.
    #[must_use]
    pub fn new(results: Vec<CheckResult>) -> Self {
        Self::with_fallback(FakeResponse::Results(results))
    }

    /// Creates a fake that always fails with the given HTTP status.
    #[must_use]
    pub fn failing(status: u16) -> Self {
        Self::with_fallback(FakeResponse::Status(status))
    }

    fn with_fallback(fallback: FakeResponse) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                queued: VecDeque::new(),
                fallback,
                delay: None,
            })),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replaces the response returned once the queue is drained.
    pub fn set_fallback(&self, response: FakeResponse) {
        self.state.lock().fallback = response;
    }

    /// Queues a one-shot response.
    pub fn push_response(&self, response: FakeResponse) {
        self.state.lock().queued.push_back(response);
    }

    /// Makes every subsequent fetch take at least `delay`.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.state.lock().delay = delay;
    }

    /// Number of fetches started so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> (FakeResponse, Option<Duration>) {
        let mut state = self.state.lock();
        let response = state
            .queued
            .pop_front()
            .unwrap_or_else(|| state.fallback.clone());
        (response, state.delay)
    }
}

impl Default for FakeResultSource {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl ResultSource for FakeResultSource {
    async fn fetch_results(&self) -> sensu_api::Result<Vec<CheckResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (response, delay) = self.next_response();

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match response {
            FakeResponse::Results(results) => Ok(results),
            FakeResponse::Status(status) => Err(ApiError::Status {
                url: FAKE_ENDPOINT.to_string(),
                status,
            }),
            FakeResponse::Malformed => Err(ApiError::Decode {
                url: FAKE_ENDPOINT.to_string(),
                reason: "expected value at line 1 column 1".to_string(),
            }),
        }
    }

    fn endpoint(&self) -> &str {
        FAKE_ENDPOINT
    }
}
