//! Stats Report Task
//!
//! Background task that periodically logs a snapshot of cache activity.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically logs cache statistics.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between reports. Taking a snapshot only needs shared access to the store,
/// so reporting never blocks concurrent lookups.
///
/// # Arguments
/// * `cache` - shared reference to the cache
/// * `interval_secs` - Interval in seconds between reports
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(CacheStore::new(1_049_000));
/// let report_handle = spawn_stats_reporter(cache.clone(), 60);
/// // Later, during shutdown:
/// report_handle.abort();
/// ```
pub fn spawn_stats_reporter(cache: Arc<CacheStore>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting stats reporter with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let stats = cache.stats();
            if stats.hits + stats.misses == 0 && stats.total_entries == 0 {
                debug!("Stats report: cache idle");
                continue;
            }

            info!(
                hits = stats.hits,
                misses = stats.misses,
                evictions = stats.evictions,
                rejections = stats.rejections,
                entries = stats.total_entries,
                used_bytes = stats.used_bytes,
                remaining_bytes = stats.remaining_bytes,
                "Stats report: hit rate {:.1}%",
                stats.hit_rate() * 100.0
            );
        }
    })
}
