use std::sync::Arc;
use std::time::Duration;

use super::mode::ExecutionMode;

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub tick: u64,
    pub interval: Duration,
    pub elapsed: Duration,
    pub mode: ExecutionMode,
    /// Configured run length, if time-bounded.
    pub duration: Option<Duration>,
    /// Total operations the run will attempt, if request-bounded.
    pub planned_total: Option<u64>,

    pub total: u64,
    pub success: u64,
    pub timeouts: u64,
    pub errors: u64,
    pub ops_per_sec_now: f64,
}

pub type ProgressFn = Arc<dyn Fn(ProgressUpdate) + Send + Sync + 'static>;
