//! Cache Module
//!
//! The in-process (L1) tier: TTL entries, FIFO-by-refresh eviction and counters.

mod entry;
mod memory;
mod order;
mod stats;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use memory::{validate_key, MemoryStore, StoreEvent};
pub use order::RefreshOrder;
pub use stats::{CacheStats, RemoteCounters, ServiceStats};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed serialized value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
