//! Memory Store Module
//!
//! The L1 tier: a bounded HashMap of TTL entries with FIFO-by-refresh eviction.

use std::collections::HashMap;

use tokio::sync::broadcast;

use crate::cache::{CacheEntry, CacheStats, RefreshOrder, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{CacheError, Result};

/// Capacity of the notification channel; slow subscribers lose the oldest events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

// == Store Event ==
/// Notification published when an entry leaves the store on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// TTL elapsed
    Expired(String),
    /// Dropped to respect the capacity bound
    Evicted(String),
}

// == Memory Store ==
/// Bounded in-process TTL cache.
#[derive(Debug)]
pub struct MemoryStore {
    entries: HashMap<String, CacheEntry>,
    order: RefreshOrder,
    stats: CacheStats,
    max_entries: usize,
    default_ttl: u64,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries, each living
    /// `default_ttl` seconds unless a TTL is given on `set`.
    pub fn new(max_entries: usize, default_ttl: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            entries: HashMap::new(),
            order: RefreshOrder::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            default_ttl,
            events,
        }
    }

    /// Subscribes to expiry and eviction notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    // == Set ==
    /// Stores a value, replacing any previous entry and resetting its TTL.
    ///
    /// At capacity, the entry with the oldest write is evicted first.
    pub fn set(&mut self, key: &str, value: String, ttl: Option<u64>) -> Result<()> {
        validate_key(key)?;

        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(key) {
            while self.entries.len() >= self.max_entries {
                match self.order.pop_oldest() {
                    Some(evicted) => {
                        self.entries.remove(&evicted);
                        self.stats.record_eviction();
                        let _ = self.events.send(StoreEvent::Evicted(evicted));
                    }
                    None => break,
                }
            }
        }

        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));
        self.entries.insert(key.to_string(), entry);
        self.order.refresh(key);
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the value if present and not expired.
    ///
    /// An expired entry found here is dropped and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                self.stats.record_hit();
                return Some(value);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            let _ = self.events.send(StoreEvent::Expired(key.to_string()));
        }
        self.stats.record_miss();
        None
    }

    /// Looks at a live value without touching statistics.
    pub fn peek(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.as_str())
    }

    /// Remaining TTL in seconds of a live entry.
    pub fn ttl(&self, key: &str) -> Option<u64> {
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::ttl_remaining)
    }

    // == Delete ==
    /// Removes an entry. Deleting an absent key is not an error.
    ///
    /// Returns whether an entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key)
    }

    // == Flush ==
    /// Drops every entry. Returns how many were removed.
    pub fn flush(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.order.clear();
        self.stats.set_total_entries(0);
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, publishing an `Expired` event for each.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.remove_entry(&key);
            let _ = self.events.send(StoreEvent::Expired(key));
        }

        self.stats.record_expirations(count);
        count
    }

    // == Stats ==
    /// Returns a snapshot of the tier's counters.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.order.remove(key);
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }
}

// == Key Validation ==
/// Rejects empty keys and keys longer than `MAX_KEY_LENGTH` bytes.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
