//! Key-value cache contract
//!
//! String keys map to string values with an optional time-to-live. Canonical
//! name mappings are stored without TTL; external lookups are stored with one.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryCache;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCache;

use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Key-value store used for canonical mappings and resolver results
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// Fetch a live (non-expired) value
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a value; `ttl = None` keeps it forever
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;
}
