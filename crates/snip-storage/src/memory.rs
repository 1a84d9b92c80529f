use crate::clock::{Clock, SystemClock};
use async_trait::async_trait;
use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use snip_core::backend::Result;
use snip_core::{KvBackend, StorageError};
use std::time::Duration;
use tracing::trace;

/// In-memory storage entry for a single key.
#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expire_at: Option<Timestamp>,
}

impl Entry {
    fn is_expired(&self, now: Timestamp) -> bool {
        self.expire_at.is_some_and(|expire_at| now >= expire_at)
    }
}

/// In-memory implementation of [`KvBackend`] using DashMap.
///
/// Expiry is evaluated lazily against the configured [`Clock`]: an expired
/// key reads as absent and is dropped on the access that notices it.
/// `incr` runs under the shard lock of its key, which makes it atomic with
/// respect to every other operation on that key. As with Redis `INCR`,
/// incrementing keeps the ttl of a live key and restarts an expired key from
/// zero with no ttl.
#[derive(Debug)]
pub struct InMemoryBackend<C = SystemClock> {
    storage: DashMap<String, Entry>,
    clock: C,
}

impl InMemoryBackend<SystemClock> {
    /// Creates a new in-memory backend driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for InMemoryBackend<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> InMemoryBackend<C> {
    /// Creates a new in-memory backend driven by `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            storage: DashMap::new(),
            clock,
        }
    }

    /// Number of stored keys, including expired keys not yet purged.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    fn expire_at(&self, ttl: Option<Duration>) -> Result<Option<Timestamp>> {
        let Some(ttl) = ttl else {
            return Ok(None);
        };

        let ttl = SignedDuration::try_from(ttl)
            .map_err(|e| StorageError::Operation(format!("invalid ttl {ttl:?}: {e}")))?;
        let expire_at = self
            .clock
            .now()
            .checked_add(ttl)
            .map_err(|e| StorageError::Operation(format!("invalid ttl {ttl:?}: {e}")))?;
        Ok(Some(expire_at))
    }
}

#[async_trait]
impl<C: Clock> KvBackend for InMemoryBackend<C> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(entry) = self.storage.get(key) else {
            return Ok(None);
        };

        if entry.is_expired(self.clock.now()) {
            drop(entry);
            trace!(key, "dropping expired key");
            self.storage
                .remove_if(key, |_, entry| entry.is_expired(self.clock.now()));
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let entry = Entry {
            value: value.to_owned(),
            expire_at: self.expire_at(ttl)?,
        };
        self.storage.insert(key.to_owned(), entry);
        Ok(())
    }

    async fn incr(&self, key: &str) -> Result<u64> {
        let now = self.clock.now();
        let mut entry = self.storage.entry(key.to_owned()).or_insert_with(|| Entry {
            value: "0".to_string(),
            expire_at: None,
        });

        if entry.is_expired(now) {
            *entry = Entry {
                value: "0".to_string(),
                expire_at: None,
            };
        }

        let current: u64 = entry.value.parse().map_err(|_| {
            StorageError::InvalidData(format!("value at '{key}' is not an integer"))
        })?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| StorageError::InvalidData(format!("increment of '{key}' overflows")))?;

        entry.value = next.to_string();
        Ok(next)
    }
}
