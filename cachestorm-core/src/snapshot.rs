use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Point-in-time server statistics, captured before and after a run.
///
/// `Default` is the zeroed snapshot used when capture fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerMetricsSnapshot {
    pub used_memory_mb: f64,
    pub evicted_keys: u64,
    pub connected_clients: u64,
    pub ops_per_sec: u64,
    pub hit_ratio: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsDelta {
    /// Rounded to 2 decimal places.
    pub memory_delta_mb: f64,
    /// Signed: a server restart between snapshots resets the counter.
    pub evicted_delta: i64,
    pub connected_clients: u64,
    pub ops_per_sec: u64,
    pub hit_ratio: f64,
}

#[must_use]
pub fn diff_snapshots(
    before: &ServerMetricsSnapshot,
    after: &ServerMetricsSnapshot,
) -> MetricsDelta {
    let evicted_delta = (after.evicted_keys as i128 - before.evicted_keys as i128)
        .clamp(i64::MIN as i128, i64::MAX as i128) as i64;

    MetricsDelta {
        memory_delta_mb: round2(after.used_memory_mb - before.used_memory_mb),
        evicted_delta,
        connected_clients: after.connected_clients,
        ops_per_sec: after.ops_per_sec,
        hit_ratio: after.hit_ratio,
    }
}

fn round2(v: f64) -> f64 {
    if !v.is_finite() {
        return 0.0;
    }
    (v * 100.0).round() / 100.0
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("failed to query server metrics: {0}")]
    Query(String),

    #[error("malformed server metrics: {0}")]
    Parse(String),
}

/// Captures [`ServerMetricsSnapshot`]s from the target.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn capture(&self) -> Result<ServerMetricsSnapshot, SnapshotError>;
}

/// Captures a snapshot, logging and zeroing on failure so the run is never blocked by it.
pub async fn capture_or_default<P>(provider: &P, phase: &str) -> ServerMetricsSnapshot
where
    P: SnapshotProvider + ?Sized,
{
    match provider.capture().await {
        Ok(s) => s,
        Err(err) => {
            tracing::warn!(phase, error = %err, "server metrics unavailable; using zeroed snapshot");
            ServerMetricsSnapshot::default()
        }
    }
}
