//! Background Tasks Module
//!
//! Contains background tasks that run alongside the cache service.
//!
//! # Tasks
//! - L1 sweep: removes expired memory-tier entries at configured intervals
//! - Event logger: logs memory-tier expiry and eviction notifications

mod cleanup;
mod events;

pub use cleanup::spawn_cleanup_task;
pub use events::spawn_event_logger;
