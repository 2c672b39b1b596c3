use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use cachestorm_core::runner::{
    Error, ExecutionMode, ProgressFn, ProgressUpdate, RunConfig, RunSummary, run_workload,
};
use cachestorm_core::{
    CacheClient, CacheResult, FaultPlan, MemoryCache, SeededRngFactory, SequenceSource,
};

/// Remembers every key it sees; each call takes `delay`.
#[derive(Default)]
struct RecordingCache {
    delay: Duration,
    keys: Mutex<Vec<String>>,
}

impl RecordingCache {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            keys: Mutex::new(Vec::new()),
        }
    }

    async fn touch(&self, key: &str) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(key.to_string());
    }

    fn keys(&self) -> Vec<String> {
        self.keys
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn worker_ids(&self) -> HashSet<u64> {
        self.keys()
            .iter()
            .filter_map(|k| k.rsplit(':').nth(1).and_then(|w| w.parse().ok()))
            .collect()
    }
}

#[async_trait]
impl CacheClient for RecordingCache {
    async fn read(&self, key: &str) -> CacheResult<Option<Bytes>> {
        self.touch(key).await;
        Ok(None)
    }

    async fn write(&self, key: &str, _payload: Bytes) -> CacheResult<()> {
        self.touch(key).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.touch(key).await;
        Ok(())
    }
}

fn config(threads: u64, requests_per_thread: u64, duration_secs: u64) -> RunConfig {
    RunConfig {
        threads,
        requests_per_thread,
        duration_secs,
        seed: Some(42),
        ..RunConfig::default()
    }
}

fn assert_invariants(s: &RunSummary) {
    assert_eq!(s.success + s.timeouts + s.errors, s.total, "{s:?}");
    assert_eq!(s.latency_samples, s.success, "{s:?}");
    assert_eq!(s.reads + s.writes + s.deletes, s.total, "{s:?}");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn requests_bounded_run_attempts_exactly_threads_times_requests() {
    let cache = Arc::new(MemoryCache::new());
    let cfg = config(4, 10, 0);

    let summary = run_workload(&cfg, cache.clone(), &SeededRngFactory::new(cfg.seed), None)
        .await
        .unwrap_or_else(|e| panic!("run failed: {e}"));

    assert_eq!(summary.mode, ExecutionMode::RequestsBounded);
    assert_eq!(summary.total, 40);
    assert_eq!(summary.success, 40);
    assert_eq!(summary.deletes, 0);
    assert_eq!(cache.calls(), 40);
    assert_invariants(&summary);
    assert!(summary.latency_min_ms <= summary.latency_p50_ms);
    assert!(summary.latency_p50_ms <= summary.latency_max_ms);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_operations_are_counted_not_raised() {
    let cache = Arc::new(MemoryCache::with_faults(FaultPlan {
        timeout_every: Some(4),
        error_every: Some(5),
        ..FaultPlan::default()
    }));
    let cfg = config(2, 50, 0);

    let summary = run_workload(&cfg, cache, &SeededRngFactory::new(cfg.seed), None)
        .await
        .unwrap_or_else(|e| panic!("run failed: {e}"));

    // Calls 1..=100: every 4th times out, every 5th not already timed out errors.
    assert_eq!(summary.total, 100);
    assert_eq!(summary.timeouts, 25);
    assert_eq!(summary.errors, 15);
    assert_eq!(summary.success, 60);
    assert_invariants(&summary);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn keys_are_unique_per_worker_and_operation() {
    let cache = Arc::new(RecordingCache::default());
    let cfg = RunConfig {
        key_prefix: "t".to_string(),
        key_tag: Some("x".to_string()),
        ..config(3, 25, 0)
    };

    run_workload(&cfg, cache.clone(), &SeededRngFactory::new(cfg.seed), None)
        .await
        .unwrap_or_else(|e| panic!("run failed: {e}"));

    let keys = cache.keys();
    assert_eq!(keys.len(), 75);
    assert!(keys.iter().all(|k| k.starts_with("t:x:")), "{keys:?}");

    let distinct: HashSet<_> = keys.iter().collect();
    assert_eq!(distinct.len(), 75);
    assert_eq!(cache.worker_ids(), HashSet::from([0, 1, 2]));
}

#[tokio::test]
async fn undefined_mode_is_rejected_before_any_call() {
    let cache = Arc::new(MemoryCache::new());

    for cfg in [config(0, 10, 0), config(0, 0, 5), config(2, 0, 0)] {
        let res = run_workload(&cfg, cache.clone(), &SeededRngFactory::new(None), None).await;
        assert!(
            matches!(res, Err(Error::UndefinedMode { .. })),
            "expected rejection for {cfg:?}"
        );
    }
    assert_eq!(cache.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timed_only_run_stops_after_duration() {
    let cache = Arc::new(RecordingCache::with_delay(Duration::from_millis(1)));
    let cfg = config(2, 0, 1);

    let started = Instant::now();
    let summary = run_workload(&cfg, cache.clone(), &SeededRngFactory::new(cfg.seed), None)
        .await
        .unwrap_or_else(|e| panic!("run failed: {e}"));
    let wall = started.elapsed();

    assert_eq!(summary.mode, ExecutionMode::TimedOnly);
    assert!(wall >= Duration::from_secs(1), "returned early: {wall:?}");
    assert!(wall < Duration::from_secs(3), "did not stop: {wall:?}");
    assert_eq!(cache.worker_ids(), HashSet::from([0, 1]));
    assert_invariants(&summary);
}

#[test]
fn timed_run_stops_when_calls_never_suspend() {
    // More workers than runtime threads, and a backend whose calls are immediately ready.
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap_or_else(|e| panic!("runtime: {e}"));
        let cfg = config(4, 0, 1);
        let res = rt.block_on(run_workload(
            &cfg,
            Arc::new(MemoryCache::new()),
            &SeededRngFactory::new(cfg.seed),
            None,
        ));
        let _ = tx.send(res);
    });

    let summary = match rx.recv_timeout(Duration::from_secs(10)) {
        Ok(res) => res.unwrap_or_else(|e| panic!("run failed: {e}")),
        Err(_) => panic!("1s timed run still running after 10s"),
    };

    assert_eq!(summary.mode, ExecutionMode::TimedOnly);
    assert!(summary.total > 0);
    assert_invariants(&summary);
}

#[tokio::test]
async fn excessive_thread_count_is_rejected_before_any_call() {
    let cache = Arc::new(MemoryCache::new());
    let cfg = config(u64::MAX, 1, 0);

    let res = run_workload(&cfg, cache.clone(), &SeededRngFactory::new(None), None).await;

    assert!(
        matches!(res, Err(Error::TooManyThreads { threads: u64::MAX, .. })),
        "{res:?}"
    );
    assert_eq!(cache.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn timed_and_bounded_run_ends_at_whichever_comes_first() {
    let cache = Arc::new(MemoryCache::with_faults(FaultPlan {
        latency: Some(Duration::from_millis(1)),
        ..FaultPlan::default()
    }));
    let cfg = config(1, 1_000_000, 1);

    let started = Instant::now();
    let summary = run_workload(&cfg, cache, &SeededRngFactory::new(cfg.seed), None)
        .await
        .unwrap_or_else(|e| panic!("run failed: {e}"));

    assert_eq!(summary.mode, ExecutionMode::TimedAndBounded);
    assert!(summary.total > 0);
    assert!(summary.total < 1_000_000);
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_invariants(&summary);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn aggressive_timed_run_deletes_and_stops_cleanly() {
    let cache = Arc::new(MemoryCache::with_faults(FaultPlan {
        latency: Some(Duration::from_millis(1)),
        ..FaultPlan::default()
    }));
    let cfg = RunConfig {
        aggressive: true,
        read_ratio: 0.5,
        ..config(2, 0, 1)
    };

    let started = Instant::now();
    let summary = run_workload(&cfg, cache, &SeededRngFactory::new(cfg.seed), None)
        .await
        .unwrap_or_else(|e| panic!("run failed: {e}"));

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(summary.deletes > 0, "{summary:?}");
    assert_invariants(&summary);
}

#[tokio::test]
async fn injected_sources_drive_operation_choice() {
    let cfg = config(2, 20, 0);

    let reads = run_workload(
        &cfg,
        Arc::new(MemoryCache::new()),
        &|_worker: u64| SequenceSource::new(vec![0.1]),
        None,
    )
    .await
    .unwrap_or_else(|e| panic!("run failed: {e}"));
    assert_eq!(reads.reads, 40);

    let writes = run_workload(
        &cfg,
        Arc::new(MemoryCache::new()),
        &|_worker: u64| SequenceSource::new(vec![0.9]),
        None,
    )
    .await
    .unwrap_or_else(|e| panic!("run failed: {e}"));
    assert_eq!(writes.writes, 40);
    assert_eq!(writes.deletes, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn progress_is_reported_while_running() {
    let updates: Arc<Mutex<Vec<ProgressUpdate>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = updates.clone();
    let progress: ProgressFn = Arc::new(move |u| {
        sink.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(u);
    });

    let cache = Arc::new(MemoryCache::with_faults(FaultPlan {
        latency: Some(Duration::from_millis(1)),
        ..FaultPlan::default()
    }));
    let cfg = config(1, 0, 2);

    let summary = run_workload(&cfg, cache, &SeededRngFactory::new(cfg.seed), Some(progress))
        .await
        .unwrap_or_else(|e| panic!("run failed: {e}"));

    let updates = updates
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    assert!(!updates.is_empty());

    let first = &updates[0];
    assert_eq!(first.tick, 1);
    assert_eq!(first.mode, ExecutionMode::TimedOnly);
    assert_eq!(first.duration, Some(Duration::from_secs(2)));
    assert_eq!(first.planned_total, None);
    assert!(first.total <= summary.total);
}
