//! Tiered Cache - a two-level read-through cache
//!
//! A bounded in-process TTL map (L1) in front of a Redis store (L2), with
//! promotion of L2 hits into L1 and degrade-to-miss behavior when L2 is down.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod remote;
pub mod service;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{CacheError, Result};
pub use remote::{KeyValueStore, RedisStore};
pub use service::{CacheItem, CacheService, Cacheable};
pub use tasks::{spawn_cleanup_task, spawn_event_logger};
