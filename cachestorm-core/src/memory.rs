use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;

use crate::cache::{CacheClient, CacheError, CacheResult};
use crate::snapshot::{ServerMetricsSnapshot, SnapshotError, SnapshotProvider};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Deterministic failure injection for [`MemoryCache`].
///
/// Faults are driven by a single call counter shared by all operations, so
/// `timeout_every: Some(3)` fails calls 3, 6, 9, ... regardless of operation kind.
/// Timeouts take precedence when both rules match the same call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaultPlan {
    pub latency: Option<Duration>,
    pub timeout_every: Option<u64>,
    pub error_every: Option<u64>,
}

/// In-process cache backend. Used by tests and by the `memory://` target.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, Bytes>,
    faults: FaultPlan,
    calls: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_faults(faults: FaultPlan) -> Self {
        Self {
            faults,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    async fn admit(&self) -> CacheResult<()> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed) + 1;

        if let Some(latency) = self.faults.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(every) = self.faults.timeout_every
            && every > 0
            && n % every == 0
        {
            return Err(CacheError::Timeout(self.faults.latency.unwrap_or_default()));
        }
        if let Some(every) = self.faults.error_every
            && every > 0
            && n % every == 0
        {
            return Err(CacheError::Backend(format!("injected failure on call {n}")));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn read(&self, key: &str) -> CacheResult<Option<Bytes>> {
        self.admit().await?;
        let value = self.entries.get(key).map(|v| v.value().clone());
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        Ok(value)
    }

    async fn write(&self, key: &str, payload: Bytes) -> CacheResult<()> {
        self.admit().await?;
        self.entries.insert(key.to_string(), payload);
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.admit().await?;
        self.entries.remove(key);
        Ok(())
    }
}

#[async_trait]
impl SnapshotProvider for MemoryCache {
    async fn capture(&self) -> Result<ServerMetricsSnapshot, SnapshotError> {
        let used: usize = self
            .entries
            .iter()
            .map(|e| e.key().len() + e.value().len())
            .sum();
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        Ok(ServerMetricsSnapshot {
            used_memory_mb: used as f64 / BYTES_PER_MB,
            evicted_keys: 0,
            connected_clients: 1,
            ops_per_sec: 0,
            hit_ratio: if lookups > 0 {
                hits as f64 / lookups as f64
            } else {
                0.0
            },
        })
    }
}
