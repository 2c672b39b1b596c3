use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};
use super::mode::{ExecutionMode, resolve_mode};

pub const DEFAULT_PAYLOAD_SIZE: usize = 256;
pub const DEFAULT_READ_RATIO: f64 = 0.8;
pub const DEFAULT_KEY_PREFIX: &str = "cachestorm";

/// Upper bound on concurrent workers; each one is a spawned task.
pub const MAX_THREADS: u64 = 100_000;

/// Chance, per completed operation in aggressive mode, of pausing before the next one.
pub const JITTER_PROBABILITY: f64 = 0.10;

/// Upper bound (exclusive) of the aggressive-mode pause.
pub const JITTER_MAX: Duration = Duration::from_millis(2);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    pub threads: u64,
    pub requests_per_thread: u64,
    pub duration_secs: u64,
    pub payload_size: usize,
    pub read_ratio: f64,
    pub aggressive: bool,
    pub key_prefix: String,
    pub key_tag: Option<String>,
    /// Fixed seed for the per-worker random streams. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            threads: 1,
            requests_per_thread: 0,
            duration_secs: 0,
            payload_size: DEFAULT_PAYLOAD_SIZE,
            read_ratio: DEFAULT_READ_RATIO,
            aggressive: false,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            key_tag: None,
            seed: None,
        }
    }
}

impl RunConfig {
    #[must_use]
    pub fn mode(&self) -> ExecutionMode {
        resolve_mode(self.threads, self.requests_per_thread, self.duration_secs)
    }

    /// Resolves the mode, rejecting configurations that cannot be executed.
    pub fn validate(&self) -> Result<ExecutionMode> {
        let mode = self.mode();
        if !mode.is_defined() {
            return Err(Error::UndefinedMode {
                threads: self.threads,
                requests_per_thread: self.requests_per_thread,
                duration_secs: self.duration_secs,
            });
        }
        if self.threads > MAX_THREADS {
            return Err(Error::TooManyThreads {
                threads: self.threads,
                max: MAX_THREADS,
            });
        }
        Ok(mode)
    }

    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        (self.duration_secs > 0).then(|| Duration::from_secs(self.duration_secs))
    }

    #[must_use]
    pub fn requests_bound(&self) -> Option<u64> {
        (self.requests_per_thread > 0).then_some(self.requests_per_thread)
    }
}
