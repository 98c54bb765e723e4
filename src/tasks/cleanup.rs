//! L1 Expiry Sweep
//!
//! Background task that periodically removes expired memory-tier entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::MemoryStore;

/// Spawns a background task that sweeps expired entries out of the memory tier.
///
/// The task sleeps `cleanup_interval_secs` between sweeps and holds the write
/// lock only for the duration of one sweep. Abort the returned handle on
/// shutdown; the task never exits on its own.
pub fn spawn_cleanup_task(
    memory: Arc<RwLock<MemoryStore>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting L1 expiry sweep with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = memory.write().await.cleanup_expired();

            if removed > 0 {
                info!("L1 sweep: removed {} expired entries", removed);
            } else {
                debug!("L1 sweep: no expired entries found");
            }
        }
    })
}
