use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use tokio::sync::Notify;

use super::config::{JITTER_MAX, JITTER_PROBABILITY};
use super::gate::IterationGate;
use super::keys::KeyBuilder;
use super::selector::{OperationKind, select_operation};
use super::stats::{OperationOutcome, RunStats};
use crate::cache::CacheClient;
use crate::random::RandomSource;

/// Run-scoped cancellation signal. Fires at most once; observers never miss it.
#[derive(Debug)]
pub struct StopSignal {
    fired: AtomicBool,
    notify: Notify,
}

impl StopSignal {
    pub fn new() -> Self {
        Self {
            fired: AtomicBool::new(false),
            notify: Notify::new(),
        }
    }

    pub fn fire(&self) {
        self.fired.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    pub async fn fired(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_fired() {
                return;
            }
            notified.await;
        }
    }

    /// Sleeps for `delay` unless the signal fires first. Returns `false` when stopped.
    pub async fn sleep(&self, delay: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(delay) => !self.is_fired(),
            _ = self.fired() => false,
        }
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) struct WorkerContext<C: ?Sized> {
    pub worker_id: u64,
    pub cache: Arc<C>,
    pub stats: Arc<RunStats>,
    pub gate: IterationGate,
    pub keys: Arc<KeyBuilder>,
    pub payload_size: usize,
    pub read_ratio: f64,
    pub aggressive: bool,
}

/// Sequential operation loop of one worker.
///
/// Returns the number of attempted operations.
pub(crate) async fn run_worker<C, R>(ctx: WorkerContext<C>, mut rng: R) -> u64
where
    C: CacheClient + ?Sized,
    R: RandomSource,
{
    tracing::debug!(worker_id = ctx.worker_id, "worker started");

    let mut payload = vec![0u8; ctx.payload_size];
    let mut op_index: u64 = 0;

    while ctx.gate.next(op_index) {
        let key = ctx.keys.key(ctx.worker_id, op_index);
        let kind = select_operation(rng.next_unit(), ctx.read_ratio, ctx.aggressive);

        let started = Instant::now();
        let result = match kind {
            OperationKind::Read => ctx.cache.read(&key).await.map(|_| ()),
            OperationKind::Write => {
                rng.fill_bytes(&mut payload);
                ctx.cache
                    .write(&key, Bytes::copy_from_slice(&payload))
                    .await
            }
            OperationKind::Delete => ctx.cache.delete(&key).await,
        };
        let outcome = OperationOutcome::classify(&result, started.elapsed());

        if let Err(err) = &result {
            tracing::trace!(worker_id = ctx.worker_id, %kind, %key, error = %err, "operation failed");
        }

        ctx.stats.record(kind, outcome);
        op_index += 1;

        if ctx.aggressive && rng.next_unit() < JITTER_PROBABILITY {
            let delay = JITTER_MAX.mul_f64(rng.next_unit());
            // A stop during the pause ends the worker without recording anything.
            if !ctx.gate.stop().sleep(delay).await {
                break;
            }
        }

        // Calls that complete without suspending would otherwise pin this task to its
        // runtime thread and starve the timer and progress tasks.
        tokio::task::yield_now().await;
    }

    tracing::debug!(worker_id = ctx.worker_id, ops = op_index, "worker stopped");
    op_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheResult;
    use crate::runner::ExecutionMode;
    use crate::random::SequenceSource;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU64;

    /// Fires the run's stop signal from inside its first call.
    struct StopOnCall {
        stop: Arc<StopSignal>,
        calls: AtomicU64,
    }

    impl StopOnCall {
        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.stop.fire();
        }
    }

    #[async_trait]
    impl CacheClient for StopOnCall {
        async fn read(&self, _key: &str) -> CacheResult<Option<Bytes>> {
            self.touch();
            Ok(None)
        }

        async fn write(&self, _key: &str, _payload: Bytes) -> CacheResult<()> {
            self.touch();
            Ok(())
        }

        async fn delete(&self, _key: &str) -> CacheResult<()> {
            self.touch();
            Ok(())
        }
    }

    #[tokio::test]
    async fn stop_during_jitter_ends_worker_without_extra_outcome() {
        let stop = Arc::new(StopSignal::new());
        let cache = Arc::new(StopOnCall {
            stop: stop.clone(),
            calls: AtomicU64::new(0),
        });
        let stats = Arc::new(RunStats::default());
        let ctx = WorkerContext {
            worker_id: 0,
            cache: cache.clone(),
            stats: stats.clone(),
            gate: IterationGate::new(Some(10), None, stop.clone()),
            keys: Arc::new(KeyBuilder::new("t", None)),
            payload_size: 8,
            read_ratio: 1.0,
            aggressive: true,
        };

        // Draws: read, jitter hit, near-maximal pause.
        let ops = run_worker(ctx, SequenceSource::new(vec![0.0, 0.0, 0.99])).await;

        assert_eq!(ops, 1);
        assert_eq!(cache.calls.load(Ordering::Relaxed), 1);
        assert_eq!(stats.total(), 1);
        assert_eq!(stats.success(), 1);
        assert_eq!(stats.timeouts() + stats.errors(), 0);
    }

    #[tokio::test]
    async fn bounded_worker_attempts_exactly_its_budget() {
        let stop = Arc::new(StopSignal::new());
        let stats = Arc::new(RunStats::default());
        let ctx = WorkerContext {
            worker_id: 3,
            cache: Arc::new(crate::MemoryCache::new()),
            stats: stats.clone(),
            gate: IterationGate::new(Some(12), None, stop),
            keys: Arc::new(KeyBuilder::new("t", None)),
            payload_size: 4,
            read_ratio: 0.5,
            aggressive: false,
        };

        let ops = run_worker(ctx, SequenceSource::new(vec![0.2, 0.7])).await;
        let summary = stats.summarize(ExecutionMode::RequestsBounded, Duration::from_secs(1));

        assert_eq!(ops, 12);
        assert_eq!((summary.reads, summary.writes, summary.deletes), (6, 6, 0));
    }

    #[tokio::test]
    async fn fired_returns_immediately_once_set() {
        let stop = StopSignal::new();
        stop.fire();
        stop.fired().await;
        assert!(stop.is_fired());
    }

    #[tokio::test]
    async fn sleep_is_cut_short_by_fire() {
        let stop = Arc::new(StopSignal::new());
        let s2 = stop.clone();
        let handle = tokio::spawn(async move { s2.sleep(Duration::from_secs(30)).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        stop.fire();

        let completed = match tokio::time::timeout(Duration::from_secs(5), handle).await {
            Ok(Ok(v)) => v,
            Ok(Err(err)) => panic!("sleep task failed: {err}"),
            Err(_) => panic!("sleep was not interrupted"),
        };
        assert!(!completed);
    }

    #[tokio::test]
    async fn sleep_completes_when_not_fired() {
        let stop = StopSignal::new();
        assert!(stop.sleep(Duration::from_millis(1)).await);
    }
}
