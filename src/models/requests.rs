//! Request DTOs for the cache HTTP API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;
use serde_json::Value;

use crate::service::CacheItem;

/// Upper bound on keys or items in one batch request
pub const MAX_BATCH_SIZE: usize = 1000;

/// Request body for PUT /cache
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub value: Value,
    /// Optional L2 TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

/// Request body for POST /cache/mget
#[derive(Debug, Clone, Deserialize)]
pub struct MgetRequest {
    pub keys: Vec<String>,
}

impl MgetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        check_batch_size(self.keys.len())
    }
}

/// Request body for PUT /cache/mset
#[derive(Debug, Clone, Deserialize)]
pub struct MsetRequest {
    pub items: Vec<CacheItem<Value>>,
}

impl MsetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        check_batch_size(self.items.len())
    }
}

fn check_batch_size(len: usize) -> Option<String> {
    if len > MAX_BATCH_SIZE {
        Some(format!("Batch exceeds maximum of {} entries", MAX_BATCH_SIZE))
    } else {
        None
    }
}
