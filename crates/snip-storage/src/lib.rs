//! Storage backends for the Snip link store.
//!
//! Both backends implement [`KvBackend`]: [`RedisBackend`] for deployments
//! and [`InMemoryBackend`] for tests and single-process setups.

pub mod clock;
pub mod memory;
pub mod redis;

pub use clock::{Clock, ManualClock, SystemClock};
pub use memory::InMemoryBackend;
pub use self::redis::RedisBackend;
pub use snip_core::{KvBackend, StorageError};
