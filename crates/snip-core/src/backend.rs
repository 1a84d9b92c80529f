use crate::error::StorageError;
use async_trait::async_trait;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, StorageError>;

/// The key-value capabilities the link store is built on.
///
/// Implementations own durability and expiry: a key whose time-to-live has
/// elapsed must read as absent. Implementations can be Redis, an in-memory
/// map, or any other store offering an atomic increment.
#[async_trait]
pub trait KvBackend: Send + Sync + 'static {
    /// Reads a value.
    ///
    /// Returns `Ok(None)` if the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    ///
    /// If `ttl` is `None` the key never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Atomically increments the integer stored at `key` and returns the new value.
    ///
    /// A missing key counts as `0`. No two callers may observe the same value.
    async fn incr(&self, key: &str) -> Result<u64>;
}
