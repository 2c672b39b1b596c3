use std::time::Duration;

use async_trait::async_trait;
use cachestorm_core::{ServerMetricsSnapshot, SnapshotError, SnapshotProvider};
use redis::aio::MultiplexedConnection;

use crate::error::map_info_error;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Reads server-side metrics with the `INFO` command.
#[derive(Clone)]
pub struct RedisInfoProvider {
    conn: MultiplexedConnection,
    timeout: Duration,
}

impl RedisInfoProvider {
    #[must_use]
    pub fn new(conn: MultiplexedConnection, timeout: Duration) -> Self {
        Self { conn, timeout }
    }
}

#[async_trait]
impl SnapshotProvider for RedisInfoProvider {
    async fn capture(&self) -> Result<ServerMetricsSnapshot, SnapshotError> {
        let mut conn = self.conn.clone();
        let cmd = redis::cmd("INFO");
        let query = cmd.query_async::<String>(&mut conn);
        let text = match tokio::time::timeout(self.timeout, query).await {
            Ok(res) => res.map_err(map_info_error)?,
            Err(_) => {
                return Err(SnapshotError::Query(format!(
                    "INFO timed out after {:?}",
                    self.timeout
                )));
            }
        };
        parse_info(&text)
    }
}

/// Parses an `INFO` reply into a snapshot.
///
/// Section headers and unknown fields are ignored; fields that are absent stay zero.
/// A reply carrying none of the known fields, or a known field with a malformed
/// number, is an error.
pub fn parse_info(text: &str) -> Result<ServerMetricsSnapshot, SnapshotError> {
    let mut snapshot = ServerMetricsSnapshot::default();
    let mut hits: u64 = 0;
    let mut misses: u64 = 0;
    let mut seen = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };

        match name {
            "used_memory" => {
                snapshot.used_memory_mb = parse_u64(name, value)? as f64 / BYTES_PER_MB;
            }
            "evicted_keys" => snapshot.evicted_keys = parse_u64(name, value)?,
            "connected_clients" => snapshot.connected_clients = parse_u64(name, value)?,
            "instantaneous_ops_per_sec" => snapshot.ops_per_sec = parse_u64(name, value)?,
            "keyspace_hits" => hits = parse_u64(name, value)?,
            "keyspace_misses" => misses = parse_u64(name, value)?,
            _ => continue,
        }
        seen = true;
    }

    if !seen {
        return Err(SnapshotError::Parse(
            "INFO reply contained no known metrics".to_string(),
        ));
    }

    let lookups = hits.saturating_add(misses);
    if lookups > 0 {
        snapshot.hit_ratio = hits as f64 / lookups as f64;
    }
    Ok(snapshot)
}

fn parse_u64(name: &str, value: &str) -> Result<u64, SnapshotError> {
    value
        .trim()
        .parse()
        .map_err(|_| SnapshotError::Parse(format!("invalid value for {name}: {value:?}")))
}
