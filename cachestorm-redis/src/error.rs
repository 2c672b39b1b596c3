use std::time::Duration;

use cachestorm_core::{CacheError, SnapshotError};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid redis target: {0}")]
    InvalidTarget(String),

    #[error("failed to create redis client: {0}")]
    Client(#[source] redis::RedisError),

    #[error("failed to connect to redis: {0}")]
    Connect(#[source] redis::RedisError),

    #[error("redis connection timed out after {0:?}")]
    ConnectTimeout(Duration),
}

/// Maps a command failure onto the engine's two-way classification.
pub(crate) fn map_redis_error(err: redis::RedisError, key: &str, op_timeout: Duration) -> CacheError {
    if err.is_timeout() {
        return CacheError::Timeout(op_timeout);
    }
    CacheError::Backend(format!("redis error for key {key}: {err}"))
}

pub(crate) fn map_info_error(err: redis::RedisError) -> SnapshotError {
    SnapshotError::Query(format!("INFO failed: {err}"))
}
