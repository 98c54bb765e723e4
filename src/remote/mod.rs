//! Remote Module
//!
//! The L2 tier: a networked key-value store holding JSON strings with
//! server-side expiry.

mod redis_store;
mod retry;

#[cfg(test)]
pub(crate) mod fakes;

use async_trait::async_trait;

use crate::error::Result;

pub use redis_store::{connection_info, RedisStore, RECONNECT_COOLDOWN};
pub use retry::{retry, RetryConfig};

// == Key Value Store ==
/// Adapter over a remote cache.
///
/// Implementations report failures as `CacheError::Remote`; deciding what a
/// failure means for the caller is left to the service.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// A name for logs, e.g. "redis".
    fn name(&self) -> &'static str;

    /// Returns the raw serialized value, `None` on a miss.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, expiring after `ttl_secs` seconds.
    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Liveness probe. Never fails; an unreachable store answers `false`.
    async fn ping(&self) -> bool;
}
