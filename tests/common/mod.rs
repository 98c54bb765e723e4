//! Shared `KeyValueStore` doubles for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tiered_cache::config::{TierConfig, TierPolicy};
use tiered_cache::{CacheError, CacheService, KeyValueStore, Result};

/// Remote store kept in process memory, honoring expiry like a real server.
#[derive(Default)]
pub struct MemoryRemote {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Live value, read without going through the service.
    pub fn raw(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|(_, expires_at)| Instant::now() < *expires_at)
            .map(|(value, _)| value.clone())
    }
}

#[async_trait]
impl KeyValueStore for MemoryRemote {
    fn name(&self) -> &'static str {
        "memory-remote"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.raw(key))
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let expires_at = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn ping(&self) -> bool {
        true
    }
}

/// Remote store whose every call fails, like an unreachable server.
pub struct DownRemote;

#[async_trait]
impl KeyValueStore for DownRemote {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(CacheError::Remote("connection refused".to_string()))
    }

    async fn set_with_expiry(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<()> {
        Err(CacheError::Remote("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(CacheError::Remote("connection refused".to_string()))
    }

    async fn ping(&self) -> bool {
        false
    }
}

pub fn cache_with_memory_remote() -> (CacheService, Arc<MemoryRemote>) {
    let remote = Arc::new(MemoryRemote::new());
    (CacheService::new(TierConfig::default(), remote.clone()), remote)
}

/// Service whose L1 entries live `l1_ttl` seconds.
pub fn cache_with_l1_ttl(l1_ttl: u64) -> (CacheService, Arc<MemoryRemote>) {
    let tiers = TierConfig {
        l1: TierPolicy::new(l1_ttl, 1_000),
        ..TierConfig::default()
    };
    let remote = Arc::new(MemoryRemote::new());
    (CacheService::new(tiers, remote.clone()), remote)
}

pub fn cache_with_down_remote() -> CacheService {
    CacheService::new(TierConfig::default(), Arc::new(DownRemote))
}
