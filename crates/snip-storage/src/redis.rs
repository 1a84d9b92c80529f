use async_trait::async_trait;
use redis::AsyncCommands;
use snip_core::backend::Result;
use snip_core::{KvBackend, StorageError};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A Redis implementation of [`KvBackend`].
///
/// Expiry is delegated to Redis (`SET ... EX`), and `incr` maps to `INCR`,
/// which returns the incremented value in the same atomic command.
#[derive(Debug, Clone)]
pub struct RedisBackend {
    conn: redis::aio::MultiplexedConnection,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() || message.to_ascii_lowercase().contains("timed out") {
        StorageError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
        StorageError::Unavailable(message)
    } else {
        StorageError::Operation(message)
    }
}

impl RedisBackend {
    /// Creates a backend from an existing multiplexed connection.
    pub fn new(conn: redis::aio::MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Opens a connection to `url` (e.g. `redis://:password@localhost:6379/0`)
    /// and verifies it with a `PING`.
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| map_redis_error("invalid Redis connection settings", e))?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;

        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to ping Redis", e))?;
        debug!("connected to Redis");

        Ok(Self::new(conn))
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        trace!(key, "GET");

        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key).await.map_err(|e| {
            warn!(key, error = %e, "Redis error on get");
            map_redis_error("failed to fetch value from Redis", e)
        })
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        trace!(key, ?ttl, "SET");

        let mut conn = self.conn.clone();
        // EX takes whole seconds; anything shorter than a second still expires
        let result = match ttl {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                    .await
            }
            None => conn.set::<_, _, ()>(key, value).await,
        };

        result.map_err(|e| {
            warn!(key, error = %e, "Redis error on set");
            map_redis_error("failed to write value to Redis", e)
        })
    }

    async fn incr(&self, key: &str) -> Result<u64> {
        trace!(key, "INCR");

        let mut conn = self.conn.clone();
        let value = conn.incr::<_, _, i64>(key, 1).await.map_err(|e| {
            warn!(key, error = %e, "Redis error on incr");
            map_redis_error("failed to increment value in Redis", e)
        })?;

        u64::try_from(value).map_err(|_| {
            StorageError::InvalidData(format!("counter at '{key}' is negative: {value}"))
        })
    }
}
