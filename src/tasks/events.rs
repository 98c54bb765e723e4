//! L1 Event Logger
//!
//! Background task that turns memory-tier notifications into log lines.

use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::StoreEvent;

/// Spawns a task logging every expiry and eviction published by the memory tier.
///
/// The task ends when the store is dropped.
pub fn spawn_event_logger(mut events: broadcast::Receiver<StoreEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(StoreEvent::Expired(key)) => debug!(key = %key, "L1 entry expired"),
                Ok(StoreEvent::Evicted(key)) => debug!(key = %key, "L1 entry evicted at capacity"),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("L1 event logger fell behind, {} events dropped", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
