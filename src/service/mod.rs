//! Cache Service Module
//!
//! Read-through / write-through orchestration of the memory tier (L1) and
//! the remote tier (L2).
//!
//! Lookups try L1, then L2; an L2 hit is copied back into L1 with L1's own
//! TTL. Writes go to L1 with its fixed TTL and then to L2 with the caller's
//! TTL. L2 failures never reach the caller: reads degrade to a miss and
//! writes/deletes are logged and dropped.

mod cacheable;
mod warmup;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{validate_key, MemoryStore, RemoteCounters, ServiceStats, MAX_VALUE_SIZE};
use crate::config::{Config, Tier, TierConfig};
use crate::error::Result;
use crate::remote::{KeyValueStore, RedisStore};

pub use cacheable::{method_key, Cacheable, DEFAULT_CACHEABLE_TTL};
pub use warmup::{FileWarmupSource, WarmupReport, WarmupSource, WARMUP_KEYS};

// == Cache Item ==
/// One entry of a batch write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheItem<T> {
    pub key: String,
    pub value: T,
    /// L2 TTL in seconds; the L2 default applies when absent
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl<T> CacheItem<T> {
    pub fn new(key: impl Into<String>, value: T) -> Self {
        Self {
            key: key.into(),
            value,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

#[derive(Debug, Default)]
struct Counters {
    l2_hits: AtomicU64,
    l2_misses: AtomicU64,
    l2_errors: AtomicU64,
    promotions: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> RemoteCounters {
        RemoteCounters {
            hits: self.l2_hits.load(Ordering::Relaxed),
            misses: self.l2_misses.load(Ordering::Relaxed),
            errors: self.l2_errors.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
        }
    }
}

// == Cache Service ==
/// Handle to the process-wide tiered cache.
///
/// Cloning is cheap and every clone shares the same tiers and counters.
/// Create one at startup and hand clones to consumers.
#[derive(Clone)]
pub struct CacheService {
    memory: Arc<RwLock<MemoryStore>>,
    remote: Arc<dyn KeyValueStore>,
    counters: Arc<Counters>,
    tiers: TierConfig,
}

impl CacheService {
    // == Constructors ==
    /// Creates a service over a fresh L1 sized by `tiers.l1` and the given L2.
    pub fn new(tiers: TierConfig, remote: Arc<dyn KeyValueStore>) -> Self {
        let l1 = tiers.policy(Tier::L1);
        let memory = MemoryStore::new(l1.max_entries, l1.ttl_secs);
        Self {
            memory: Arc::new(RwLock::new(memory)),
            remote,
            counters: Arc::new(Counters::default()),
            tiers,
        }
    }

    /// Creates a service backed by Redis and starts connecting in the
    /// background. Must be called within a Tokio runtime.
    ///
    /// Serves from L1 alone until the connection is up.
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote = Arc::new(RedisStore::new(&config.remote)?);
        remote.spawn_connect();
        Ok(Self::new(config.tiers.clone(), remote))
    }

    /// Shared handle to the L1 store.
    pub fn memory(&self) -> Arc<RwLock<MemoryStore>> {
        self.memory.clone()
    }

    pub fn tiers(&self) -> &TierConfig {
        &self.tiers
    }

    // == Get ==
    /// Looks a key up in L1, then L2, promoting L2 hits into L1.
    ///
    /// Returns `None` on a miss, on an L2 failure, or when the cached payload
    /// does not decode into `T`. Misses are not cached.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if validate_key(key).is_err() {
            debug!(key, "Lookup with invalid key");
            return None;
        }

        let local = self.memory.write().await.get(key);
        if let Some(raw) = local {
            debug!(key, "L1 hit");
            return decode(key, &raw);
        }

        let raw = match self.remote.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                Counters::bump(&self.counters.l2_misses);
                debug!(key, "Cache miss");
                return None;
            }
            Err(e) => {
                Counters::bump(&self.counters.l2_errors);
                warn!(key, store = self.remote.name(), "L2 lookup failed, treating as miss: {}", e);
                return None;
            }
        };

        Counters::bump(&self.counters.l2_hits);
        let value = decode(key, &raw)?;
        self.promote(key, raw).await;
        Some(value)
    }

    /// Untyped lookup.
    pub async fn get_value(&self, key: &str) -> Option<Value> {
        self.get(key).await
    }

    async fn promote(&self, key: &str, raw: String) {
        match self.memory.write().await.set(key, raw, None) {
            Ok(()) => {
                Counters::bump(&self.counters.promotions);
                debug!(key, "Promoted L2 hit into L1");
            }
            Err(e) => debug!(key, "Skipped promotion: {}", e),
        }
    }

    // == Set ==
    /// Writes a value to both tiers.
    ///
    /// L1 always uses its own TTL; `ttl` (or the L2 default) applies to L2.
    /// Invalid keys and unserializable values fail before anything is
    /// written. An L2 failure is logged and does not undo the L1 write.
    ///
    /// Values larger than [`MAX_VALUE_SIZE`] skip L1 and go to L2 only.
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Option<u64>) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        validate_key(key)?;
        let raw = serde_json::to_string(value)?;

        {
            let mut memory = self.memory.write().await;
            if raw.len() > MAX_VALUE_SIZE {
                // Drop any older copy so reads fall through to L2
                memory.delete(key);
                debug!(key, size = raw.len(), "Value too large for L1, caching in L2 only");
            } else {
                memory.set(key, raw.clone(), None)?;
            }
        }

        let ttl = ttl.unwrap_or(self.tiers.policy(Tier::L2).ttl_secs);
        if let Err(e) = self.remote.set_with_expiry(key, &raw, ttl).await {
            Counters::bump(&self.counters.l2_errors);
            warn!(key, store = self.remote.name(), "L2 write failed: {}", e);
        }

        Ok(())
    }

    // == Delete ==
    /// Removes a key from both tiers. Best-effort: L2 failures are logged.
    pub async fn delete(&self, key: &str) {
        self.memory.write().await.delete(key);

        if let Err(e) = self.remote.delete(key).await {
            Counters::bump(&self.counters.l2_errors);
            warn!(key, store = self.remote.name(), "L2 delete failed: {}", e);
        }
    }

    // == Batch ==
    /// Looks up every key concurrently. The i-th slot answers the i-th key.
    pub async fn mget<T, K>(&self, keys: &[K]) -> Vec<Option<T>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        join_all(keys.iter().map(|key| self.get::<T>(key.as_ref()))).await
    }

    /// Writes every item in order. A failing item does not stop the batch
    /// and nothing already written is rolled back; the first failure is
    /// returned once all items have been attempted.
    pub async fn mset<T: Serialize>(&self, items: &[CacheItem<T>]) -> Result<()> {
        let mut first_error = None;

        for item in items {
            if let Err(e) = self.set(&item.key, &item.value, item.ttl).await {
                warn!(key = %item.key, "Batch write skipped item: {}", e);
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    // == Cache Aside ==
    /// Returns the cached value for `key`, or runs `compute`, caches its
    /// result and returns it. Errors from `compute` propagate and are not cached.
    pub async fn get_or_compute<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Option<u64>,
        compute: F,
    ) -> std::result::Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        if let Some(hit) = self.get(key).await {
            return Ok(hit);
        }

        let value = compute().await?;
        if let Err(e) = self.set(key, &value, ttl).await {
            warn!(key, "Computed value not cached: {}", e);
        }
        Ok(value)
    }

    // == Maintenance ==
    /// Drops every L1 entry. L2 is left untouched.
    pub async fn flush_local(&self) -> usize {
        self.memory.write().await.flush()
    }

    // == Diagnostics ==
    /// Snapshot of both tiers' counters plus L2 liveness.
    pub async fn stats(&self) -> ServiceStats {
        let l1 = self.memory.read().await.stats();
        let l2_connected = self.remote.ping().await;
        ServiceStats::new(l1, self.counters.snapshot(), l2_connected)
    }

    /// Pings L2. Answers `false` rather than failing.
    pub async fn health_check(&self) -> bool {
        self.remote.ping().await
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, "Cached payload does not decode, treating as miss: {}", e);
            None
        }
    }
}
