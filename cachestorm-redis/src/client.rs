use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use cachestorm_core::{CacheClient, CacheError, CacheResult};
use redis::AsyncCommands as _;
use redis::aio::MultiplexedConnection;

use crate::error::map_redis_error;
use crate::info::RedisInfoProvider;
use crate::{Error, Result};

/// Bound on establishing the initial connection. An unreachable host otherwise waits
/// for the OS-level TCP timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// [`CacheClient`] over a single multiplexed Redis connection.
///
/// Every worker clones the connection handle per call; clones share one socket and
/// pipeline their commands over it.
#[derive(Clone)]
pub struct RedisCache {
    conn: MultiplexedConnection,
    op_timeout: Duration,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("op_timeout", &self.op_timeout)
            .finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects to `url` (`redis://[user[:password]@]host[:port][/db]`).
    ///
    /// `op_timeout` bounds each GET/SET/DEL; an expired bound is reported as
    /// [`CacheError::Timeout`].
    pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url).map_err(Error::Client)?;
        let conn = match tokio::time::timeout(
            DEFAULT_CONNECT_TIMEOUT,
            client.get_multiplexed_async_connection(),
        )
        .await
        {
            Ok(res) => res.map_err(Error::Connect)?,
            Err(_) => return Err(Error::ConnectTimeout(DEFAULT_CONNECT_TIMEOUT)),
        };

        tracing::debug!(?op_timeout, "connected to redis");
        Ok(Self::with_connection(conn, op_timeout))
    }

    #[must_use]
    pub fn with_connection(conn: MultiplexedConnection, op_timeout: Duration) -> Self {
        Self { conn, op_timeout }
    }

    #[must_use]
    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }

    /// Server metrics provider sharing this client's connection.
    #[must_use]
    pub fn info_provider(&self) -> RedisInfoProvider {
        RedisInfoProvider::new(self.conn.clone(), self.op_timeout)
    }

    async fn bounded<T, F>(&self, key: &str, fut: F) -> CacheResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        bounded_call(self.op_timeout, key, fut).await
    }
}

/// Runs one command under `op_timeout` and classifies its failure.
async fn bounded_call<T, F>(op_timeout: Duration, key: &str, fut: F) -> CacheResult<T>
where
    F: Future<Output = redis::RedisResult<T>>,
{
    match tokio::time::timeout(op_timeout, fut).await {
        Ok(res) => res.map_err(|e| map_redis_error(e, key, op_timeout)),
        Err(_) => {
            tracing::debug!(key, ?op_timeout, "redis command timed out");
            Err(CacheError::Timeout(op_timeout))
        }
    }
}

#[async_trait]
impl CacheClient for RedisCache {
    async fn read(&self, key: &str) -> CacheResult<Option<Bytes>> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = self.bounded(key, conn.get(key)).await?;
        Ok(value.map(Bytes::from))
    }

    async fn write(&self, key: &str, payload: Bytes) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        self.bounded::<(), _>(key, conn.set(key, payload.as_ref()))
            .await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();
        let _removed: i64 = self.bounded(key, conn.del(key)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn expired_bound_is_a_timeout() {
        let op_timeout = Duration::from_millis(20);
        let res: CacheResult<()> =
            bounded_call(op_timeout, "k:0:0", std::future::pending::<redis::RedisResult<()>>())
                .await;

        assert_eq!(res, Err(CacheError::Timeout(op_timeout)));
        assert!(logs_contain("redis command timed out"));
    }

    #[tokio::test]
    async fn completed_command_passes_through() {
        let res = bounded_call(Duration::from_secs(1), "k", async {
            Ok::<_, redis::RedisError>(Some(b"v".to_vec()))
        })
        .await;

        assert_eq!(res, Ok(Some(b"v".to_vec())));
    }

    #[tokio::test]
    async fn driver_errors_are_classified() {
        let op_timeout = Duration::from_secs(1);

        let timed_out = bounded_call(op_timeout, "k", async {
            Err::<(), _>(redis::RedisError::from(io::Error::new(
                io::ErrorKind::TimedOut,
                "read timed out",
            )))
        })
        .await;
        assert_eq!(timed_out, Err(CacheError::Timeout(op_timeout)));

        let refused = bounded_call(op_timeout, "k", async {
            Err::<(), _>(redis::RedisError::from(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "refused",
            )))
        })
        .await;
        assert!(matches!(refused, Err(CacheError::Backend(_))), "{refused:?}");
    }
}
