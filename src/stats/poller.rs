//! Background poll loop
//!
//! Fetches a snapshot, applies its deltas, then sleeps for the configured
//! interval. Cycles never overlap, so the series store needs no locking.

use crate::metrics::MetricSink;
use crate::stats::delta::{apply_snapshot, ApplyReport};
use crate::stats::error::FetchResult;
use crate::stats::fetcher::SnapshotSource;
use crate::stats::state::SeriesStore;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Drives fetch and apply cycles on a fixed interval
pub struct Poller<S, K> {
    source: S,
    sink: K,
    store: SeriesStore,
    interval: Duration,
}

impl<S, K> Poller<S, K>
where
    S: SnapshotSource + 'static,
    K: MetricSink + 'static,
{
    pub fn new(source: S, sink: K, interval: Duration) -> Self {
        Self {
            source,
            sink,
            store: SeriesStore::new(),
            interval,
        }
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// Run a single cycle
    ///
    /// On fetch failure nothing is mutated and the error is returned.
    pub async fn poll_once(&mut self) -> FetchResult<ApplyReport> {
        let snapshot = self.source.fetch().await?;
        Ok(apply_snapshot(&mut self.store, &snapshot, &self.sink))
    }

    /// Poll until `shutdown` flips to `true` or its sender is dropped
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(interval = ?self.interval, "Stats poller started");

        loop {
            match self.poll_once().await {
                Ok(report) => {
                    tracing::info!(
                        increments = report.increments,
                        resets = report.resets,
                        users = report.users_seen,
                        new_users = report.new_users,
                        "Stats are successfully updated"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "Error polling stats endpoint, trying again in {:?}",
                        self.interval
                    );
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Stats poller stopped");
    }

    /// Start the poll loop on its own task
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::InMemorySink;
    use crate::stats::error::FetchError;
    use crate::stats::types::{Category, Direction, Snapshot, TrafficCounters};
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Replays scripted results, then keeps failing
    struct ScriptedSource {
        script: Mutex<VecDeque<FetchResult<Snapshot>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(script: Vec<FetchResult<Snapshot>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl SnapshotSource for ScriptedSource {
        fn fetch(&self) -> impl Future<Output = FetchResult<Snapshot>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .script
                .lock()
                .pop_front()
                .unwrap_or(Err(FetchError::BadStatus(503)));
            async move { next }
        }
    }

    fn direct(down: u64) -> Snapshot {
        Snapshot::default().with_fixed(Category::OutboundDirect, TrafficCounters::new(down, 0))
    }

    #[tokio::test]
    async fn test_failed_poll_leaves_state_untouched() {
        let sink = Arc::new(InMemorySink::new());
        let source = ScriptedSource::new(vec![
            Ok(direct(100).with_user("alice", TrafficCounters::new(7, 7))),
            Err(FetchError::RequestFailed("connection refused".into())),
        ]);
        let mut poller = Poller::new(source, Arc::clone(&sink), Duration::from_secs(15));

        poller.poll_once().await.unwrap();
        let store_before = poller.store().clone();
        let fixed_before = sink.fixed_values();
        let users_before = sink.user_values();

        assert!(poller.poll_once().await.is_err());
        assert_eq!(poller.store(), &store_before);
        assert_eq!(sink.fixed_values(), fixed_before);
        assert_eq!(sink.user_values(), users_before);
    }

    #[tokio::test]
    async fn test_poll_once_applies_deltas() {
        let sink = Arc::new(InMemorySink::new());
        let source = ScriptedSource::new(vec![Ok(direct(10)), Ok(direct(25))]);
        let mut poller = Poller::new(source, Arc::clone(&sink), Duration::from_secs(15));

        poller.poll_once().await.unwrap();
        let report = poller.poll_once().await.unwrap();

        assert_eq!(report.increments, 1);
        assert_eq!(sink.fixed_value(Category::OutboundDirect, Direction::Downlink), 25);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_survives_failures_and_sleeps_between_cycles() {
        let sink = Arc::new(InMemorySink::new());
        let source = ScriptedSource::new(vec![
            Ok(direct(100)),
            Err(FetchError::Timeout(Duration::from_secs(10))),
            Ok(direct(150)),
        ]);
        let calls = Arc::clone(&source.calls);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let poller = Poller::new(source, Arc::clone(&sink), Duration::from_secs(15));
        let handle = poller.spawn(shutdown_rx);

        // First cycle runs immediately
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sink.fixed_value(Category::OutboundDirect, Direction::Downlink), 100);

        // Second cycle fails, loop keeps going
        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sink.fixed_value(Category::OutboundDirect, Direction::Downlink), 100);

        tokio::time::sleep(Duration::from_secs(15)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(sink.fixed_value(Category::OutboundDirect, Direction::Downlink), 150);

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_sender_stops_loop() {
        let source = ScriptedSource::new(vec![]);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle =
            Poller::new(source, InMemorySink::new(), Duration::from_secs(60)).spawn(shutdown_rx);

        drop(shutdown_tx);
        handle.await.unwrap();
    }
}
