//! Cache Statistics Module
//!
//! Counters for the memory tier and the derived service-wide snapshot.

use serde::Serialize;

// == Cache Stats ==
/// Memory tier (L1) counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from L1
    pub hits: u64,
    /// Lookups L1 could not answer (absent or expired)
    pub misses: u64,
    /// Entries dropped by the capacity bound
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.hits + self.misses)
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}

// == Service Stats ==
/// Read-only snapshot across both wired tiers.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStats {
    /// L1 counters
    pub l1: CacheStats,
    /// L1 hit rate
    pub l1_hit_rate: f64,
    /// Lookups answered by L2 after an L1 miss
    pub l2_hits: u64,
    /// Lookups that missed both tiers
    pub l2_misses: u64,
    /// Remote failures absorbed by the service
    pub l2_errors: u64,
    /// L2 hits copied back into L1
    pub promotions: u64,
    /// Result of a liveness ping against L2
    pub l2_connected: bool,
    /// (L1 hits + L2 hits) / lookups
    pub hit_rate: f64,
}

impl ServiceStats {
    pub fn new(l1: CacheStats, remote: RemoteCounters, l2_connected: bool) -> Self {
        let hit_rate = ratio(l1.hits + remote.hits, l1.hits + l1.misses);
        Self {
            l1_hit_rate: l1.hit_rate(),
            l1,
            l2_hits: remote.hits,
            l2_misses: remote.misses,
            l2_errors: remote.errors,
            promotions: remote.promotions,
            l2_connected,
            hit_rate,
        }
    }
}

/// Point-in-time copy of the service's L2 counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemoteCounters {
    pub hits: u64,
    pub misses: u64,
    pub errors: u64,
    pub promotions: u64,
}

fn ratio(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
