use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Failure of a single cache call.
///
/// The engine only distinguishes timeouts from everything else; backends keep the
/// underlying cause in the message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("cache operation failed: {0}")]
    Backend(String),
}

impl CacheError {
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Read/write/delete capability against the target store.
///
/// Implementations are shared by every worker of a run, so they must tolerate
/// concurrent calls (a multiplexed connection, a pool, or per-call isolation).
/// Connection lifecycle and retries are the implementation's business.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// `Ok(None)` is a miss, which still counts as a successful operation.
    async fn read(&self, key: &str) -> CacheResult<Option<Bytes>>;

    async fn write(&self, key: &str, payload: Bytes) -> CacheResult<()>;

    async fn delete(&self, key: &str) -> CacheResult<()>;
}
