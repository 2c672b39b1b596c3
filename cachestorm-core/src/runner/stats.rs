use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::mode::ExecutionMode;
use super::percentile::percentile;
use super::selector::OperationKind;
use crate::cache::CacheError;

/// Floor for the wall-clock divisor so very short runs don't divide by zero.
const MIN_ELAPSED_SECS: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperationOutcome {
    Success(Duration),
    Timeout,
    Error,
}

impl OperationOutcome {
    #[must_use]
    pub fn classify<T>(result: &Result<T, CacheError>, elapsed: Duration) -> Self {
        match result {
            Ok(_) => Self::Success(elapsed),
            Err(err) if err.is_timeout() => Self::Timeout,
            Err(_) => Self::Error,
        }
    }
}

/// Run-scoped accumulator shared by all workers.
///
/// Counters are lock-free; successful latencies (in milliseconds) are appended under a
/// single mutex held only for the push.
#[derive(Debug, Default)]
pub struct RunStats {
    total: AtomicU64,
    success: AtomicU64,
    timeouts: AtomicU64,
    errors: AtomicU64,
    reads: AtomicU64,
    writes: AtomicU64,
    deletes: AtomicU64,
    latencies_ms: Mutex<Vec<f64>>,
}

impl RunStats {
    pub fn record(&self, kind: OperationKind, outcome: OperationOutcome) {
        match kind {
            OperationKind::Read => self.reads.fetch_add(1, Ordering::Relaxed),
            OperationKind::Write => self.writes.fetch_add(1, Ordering::Relaxed),
            OperationKind::Delete => self.deletes.fetch_add(1, Ordering::Relaxed),
        };

        match outcome {
            OperationOutcome::Success(elapsed) => {
                // Push before bumping the counter so `latencies == success` holds for any
                // observer that reads the counter first.
                self.latencies_ms
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .push(elapsed.as_secs_f64() * 1000.0);
                self.success.fetch_add(1, Ordering::Relaxed);
            }
            OperationOutcome::Timeout => {
                self.timeouts.fetch_add(1, Ordering::Relaxed);
            }
            OperationOutcome::Error => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }

        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn success(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Builds the final summary. Call only after every worker has stopped.
    pub fn summarize(&self, mode: ExecutionMode, elapsed: Duration) -> RunSummary {
        let latencies = self
            .latencies_ms
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        let total = self.total();
        let (latency_min_ms, latency_max_ms) = latencies
            .iter()
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((*v, *v)),
                Some((lo, hi)) => Some((lo.min(*v), hi.max(*v))),
            })
            .unwrap_or((0.0, 0.0));
        let latency_avg_ms = if latencies.is_empty() {
            0.0
        } else {
            latencies.iter().sum::<f64>() / latencies.len() as f64
        };

        RunSummary {
            mode,
            total,
            success: self.success(),
            timeouts: self.timeouts(),
            errors: self.errors(),
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            latency_samples: latencies.len() as u64,
            latency_avg_ms,
            latency_p50_ms: percentile(&latencies, 50.0),
            latency_p95_ms: percentile(&latencies, 95.0),
            latency_p99_ms: percentile(&latencies, 99.0),
            latency_min_ms,
            latency_max_ms,
            throughput: total as f64 / elapsed.as_secs_f64().max(MIN_ELAPSED_SECS),
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub mode: ExecutionMode,

    pub total: u64,
    pub success: u64,
    pub timeouts: u64,
    pub errors: u64,

    pub reads: u64,
    pub writes: u64,
    pub deletes: u64,

    /// Number of recorded latencies; equals `success`.
    pub latency_samples: u64,
    pub latency_avg_ms: f64,
    pub latency_p50_ms: f64,
    pub latency_p95_ms: f64,
    pub latency_p99_ms: f64,
    pub latency_min_ms: f64,
    pub latency_max_ms: f64,

    /// Operations per second over the wall-clock run time.
    pub throughput: f64,
    pub elapsed_ms: f64,
}
