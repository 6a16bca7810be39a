//! TTL Cleanup Task
//!
//! Background task that periodically removes cached reads past their TTL.
//! Expired entries are already skipped on lookup; this keeps them from
//! holding capacity until then.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::TaggedCache;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// # Arguments
/// * `cache` - Cache instance whose store is swept
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(cache: TaggedCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));
    let store = cache.store();

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            if cache.is_disposed() {
                debug!("TTL cleanup: cache disposed, stopping");
                break;
            }

            let removed = store.write().await.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
