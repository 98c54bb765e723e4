//! In-process `KeyValueStore` doubles for unit and property tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::KeyValueStore;
use crate::cache::current_timestamp_ms;
use crate::error::{CacheError, Result};

/// HashMap-backed store honoring expiry; can be switched offline.
#[derive(Default)]
pub(crate) struct FakeRemote {
    entries: Mutex<HashMap<String, (String, u64)>>,
    offline: AtomicBool,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Live raw value, bypassing the offline switch.
    pub(crate) fn raw(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .filter(|(_, expires_at)| current_timestamp_ms() < *expires_at)
            .map(|(value, _)| value.clone())
    }

    pub(crate) fn insert_raw(&self, key: &str, value: &str, ttl_secs: u64) {
        let expires_at = current_timestamp_ms() + ttl_secs * 1000;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), expires_at));
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(CacheError::Remote("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueStore for FakeRemote {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_online()?;
        Ok(self.raw(key))
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        self.check_online()?;
        self.insert_raw(key, value, ttl_secs);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.check_online()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    async fn ping(&self) -> bool {
        self.check_online().is_ok()
    }
}
