//! Periodic cache refresh.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::collector::CheckCollector;
use crate::source::ResultSource;

/// Spawn a task that refreshes the collector's cache every `interval`.
///
/// The first refresh runs immediately, so the cache is usually warm before
/// the first scrape arrives. Ticks that find a refresh already in flight are
/// skipped. The task runs until aborted.
pub fn spawn_poller<S: ResultSource>(
    collector: CheckCollector<S>,
    interval: Duration,
) -> JoinHandle<()> {
    info!(interval = ?interval, "starting sensu poller");

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if !collector.refresh().await {
                debug!("refresh already in flight, skipping tick");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::CollectorOptions;
    use crate::source::FakeResultSource;
    use sensu_api::CheckResult;

    #[tokio::test]
    async fn poller_warms_cache_before_first_scrape() {
        let fake = FakeResultSource::new(vec![CheckResult::new("node1", "disk", 0)]);
        let collector = CheckCollector::new(fake.clone(), CollectorOptions::new().with_cache(true));

        let handle = spawn_poller(collector.clone(), Duration::from_secs(60));
        for _ in 0..100 {
            if collector.is_cached().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        handle.abort();

        assert!(collector.is_cached().await);
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_refreshes_every_interval() {
        let fake = FakeResultSource::new(Vec::new());
        let collector = CheckCollector::new(fake.clone(), CollectorOptions::new().with_cache(true));

        let handle = spawn_poller(collector, Duration::from_secs(10));
        tokio::time::sleep(Duration::from_secs(35)).await;
        handle.abort();

        // Ticks at 0s, 10s, 20s and 30s.
        assert_eq!(fake.calls(), 4);
    }
}
