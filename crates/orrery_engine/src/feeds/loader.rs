//! Background feed loading
//!
//! Each feed runs on its own worker thread. Workers never see the scene: they
//! only send descriptor lists back over a channel that the render thread
//! drains once per tick. Clearing the shared liveness flag turns any result
//! that completes afterwards into a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use super::{DataFeed, ObjectDescriptor, ObjectKind};
use crate::core::config::FeedConfig;

/// Result of one feed, delivered to the render thread
#[derive(Debug, Clone, PartialEq)]
pub struct FeedBatch {
    /// Which feed produced the batch
    pub kind: ObjectKind,
    /// Descriptors in source order; empty when the feed failed
    pub descriptors: Vec<ObjectDescriptor>,
}

/// Runs feeds off the render thread and hands their results back
pub struct FeedLoader {
    receiver: Option<Receiver<FeedBatch>>,
    alive: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
    pending: Vec<ObjectKind>,
}

impl FeedLoader {
    /// Start one worker per kind
    pub fn spawn(feed: Arc<dyn DataFeed>, kinds: &[ObjectKind], config: &FeedConfig) -> Self {
        let (sender, receiver) = unbounded();
        let alive = Arc::new(AtomicBool::new(true));
        let mut workers = Vec::with_capacity(kinds.len());
        let mut pending = Vec::with_capacity(kinds.len());

        for &kind in kinds {
            let feed = Arc::clone(&feed);
            let alive = Arc::clone(&alive);
            let sender = sender.clone();
            let config = config.clone();

            let spawned = std::thread::Builder::new()
                .name(format!("feed-{kind}"))
                .spawn(move || run_worker(&*feed, kind, &config, &alive, &sender));

            match spawned {
                Ok(handle) => {
                    workers.push(handle);
                    pending.push(kind);
                }
                Err(e) => log::error!("Could not start {kind} feed worker: {e}"),
            }
        }

        log::info!("Requested {} feed(s)", pending.len());
        Self {
            receiver: Some(receiver),
            alive,
            workers,
            pending,
        }
    }

    /// Drain every batch that has arrived, without blocking
    pub fn poll(&mut self) -> Vec<FeedBatch> {
        if !self.is_alive() {
            return Vec::new();
        }
        let batches: Vec<FeedBatch> = match &self.receiver {
            Some(receiver) => receiver.try_iter().collect(),
            None => Vec::new(),
        };
        for batch in &batches {
            self.mark_resolved(batch.kind);
        }
        batches
    }

    /// Wait up to `timeout` for the next batch
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<FeedBatch> {
        if !self.is_alive() {
            return None;
        }
        let batch = match self.receiver.as_ref()?.recv_timeout(timeout) {
            Ok(batch) => batch,
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return None,
        };
        self.mark_resolved(batch.kind);
        Some(batch)
    }

    /// Kinds whose feed has not delivered yet
    pub fn pending_feeds(&self) -> &[ObjectKind] {
        &self.pending
    }

    /// Whether results are still being accepted
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Stop accepting results
    ///
    /// In-flight fetches are not interrupted; they finish on their own and
    /// their results are dropped. The worker handles are returned so callers
    /// may join them or let them detach.
    pub fn shutdown(mut self) -> Vec<JoinHandle<()>> {
        self.close();
        std::mem::take(&mut self.workers)
    }

    fn close(&mut self) {
        self.alive.store(false, Ordering::Release);
        self.receiver = None;
        if !self.pending.is_empty() {
            log::debug!("Abandoning {} in-flight feed(s)", self.pending.len());
            self.pending.clear();
        }
    }

    fn mark_resolved(&mut self, kind: ObjectKind) {
        self.pending.retain(|&k| k != kind);
    }
}

impl Drop for FeedLoader {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_worker(
    feed: &dyn DataFeed,
    kind: ObjectKind,
    config: &FeedConfig,
    alive: &AtomicBool,
    sender: &Sender<FeedBatch>,
) {
    let descriptors = fetch_with_retry(feed, kind, config, alive);

    if !alive.load(Ordering::Acquire) {
        log::debug!("Discarding {} {kind} descriptor(s) that arrived after teardown", descriptors.len());
        return;
    }

    log::info!("{kind} feed delivered {} descriptor(s)", descriptors.len());
    if sender.send(FeedBatch { kind, descriptors }).is_err() {
        log::debug!("{kind} feed result dropped, loader already closed");
    }
}

fn fetch_with_retry(
    feed: &dyn DataFeed,
    kind: ObjectKind,
    config: &FeedConfig,
    alive: &AtomicBool,
) -> Vec<ObjectDescriptor> {
    let mut attempt = 0;
    loop {
        match feed.fetch(kind) {
            Ok(descriptors) => return descriptors,
            Err(e) if e.is_transient() && attempt < config.max_retries && alive.load(Ordering::Acquire) => {
                attempt += 1;
                let delay = config.backoff_for(attempt);
                log::warn!("{kind} feed failed ({e}), retry {attempt}/{} in {delay:?}", config.max_retries);
                std::thread::sleep(delay);
            }
            Err(e) => {
                log::error!("{kind} feed failed: {e}");
                return Vec::new();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::FeedError;
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU32;

    const WAIT: Duration = Duration::from_secs(5);

    fn fast_config(max_retries: u32) -> FeedConfig {
        FeedConfig {
            max_retries,
            retry_backoff_ms: 1,
            ..FeedConfig::default()
        }
    }

    fn fireballs(count: usize) -> Vec<ObjectDescriptor> {
        (0..count)
            .map(|i| ObjectDescriptor::new(format!("fb-{i}"), ObjectKind::Fireball))
            .collect()
    }

    /// Fails transiently a fixed number of times, then succeeds
    struct FlakyFeed {
        failures_left: AtomicU32,
        calls: AtomicU32,
    }

    impl DataFeed for FlakyFeed {
        fn fetch_fireballs(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let left = self.failures_left.load(Ordering::SeqCst);
            if left > 0 {
                self.failures_left.store(left - 1, Ordering::SeqCst);
                return Err(FeedError::Status { url: "test".into(), status: 503 });
            }
            Ok(fireballs(2))
        }

        fn fetch_small_bodies(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FeedError::Parse("not json".into()))
        }
    }

    /// Blocks until released, then returns its payload
    struct GatedFeed {
        gate: Mutex<Receiver<()>>,
    }

    impl DataFeed for GatedFeed {
        fn fetch_fireballs(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
            let gate = self.gate.lock().unwrap();
            let _ = gate.recv();
            Ok(fireballs(5))
        }

        fn fetch_small_bodies(&self) -> Result<Vec<ObjectDescriptor>, FeedError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_transient_failures_are_retried() {
        let feed = Arc::new(FlakyFeed { failures_left: AtomicU32::new(2), calls: AtomicU32::new(0) });
        let mut loader = FeedLoader::spawn(feed.clone(), &[ObjectKind::Fireball], &fast_config(2));

        let batch = loader.recv_timeout(WAIT).unwrap();
        assert_eq!(batch.kind, ObjectKind::Fireball);
        assert_eq!(batch.descriptors.len(), 2);
        assert_eq!(feed.calls.load(Ordering::SeqCst), 3);
        assert!(loader.pending_feeds().is_empty());
    }

    #[test]
    fn test_exhausted_retries_yield_empty_batch() {
        let feed = Arc::new(FlakyFeed { failures_left: AtomicU32::new(5), calls: AtomicU32::new(0) });
        let mut loader = FeedLoader::spawn(feed.clone(), &[ObjectKind::Fireball], &fast_config(1));

        let batch = loader.recv_timeout(WAIT).unwrap();
        assert!(batch.descriptors.is_empty());
        assert_eq!(feed.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_permanent_failure_is_not_retried() {
        let feed = Arc::new(FlakyFeed { failures_left: AtomicU32::new(0), calls: AtomicU32::new(0) });
        let mut loader = FeedLoader::spawn(feed.clone(), &[ObjectKind::SmallBody], &fast_config(3));

        let batch = loader.recv_timeout(WAIT).unwrap();
        assert_eq!(batch.kind, ObjectKind::SmallBody);
        assert!(batch.descriptors.is_empty());
        assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pending_until_delivered() {
        let (release, gate) = unbounded();
        let feed = Arc::new(GatedFeed { gate: Mutex::new(gate) });
        let mut loader = FeedLoader::spawn(feed, &[ObjectKind::Fireball], &fast_config(0));

        assert!(loader.poll().is_empty());
        assert_eq!(loader.pending_feeds(), [ObjectKind::Fireball]);

        release.send(()).unwrap();
        let batch = loader.recv_timeout(WAIT).unwrap();
        assert_eq!(batch.descriptors.len(), 5);
        assert!(loader.pending_feeds().is_empty());
    }

    #[test]
    fn test_result_after_shutdown_is_discarded() {
        let (release, gate) = unbounded();
        let feed = Arc::new(GatedFeed { gate: Mutex::new(gate) });
        let loader = FeedLoader::spawn(feed, &[ObjectKind::Fireball], &fast_config(0));

        let workers = loader.shutdown();
        release.send(()).unwrap();
        for worker in workers {
            assert!(worker.join().is_ok());
        }
    }
}
