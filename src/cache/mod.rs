//! Cache Module
//!
//! Provides the shared, byte-bounded response cache with approximate LRU
//! eviction and reader/writer admission control.

mod entry;
mod gate;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::{CacheEntry, EntrySummary};
pub use gate::{AdmissionGate, ReadGuard, WriteGuard};
pub use lru::RecencyList;
pub use stats::{CacheCounters, CacheStats};
pub use store::CacheStore;

// == Public Constants ==
/// Default aggregate byte budget for all cached objects
pub const DEFAULT_MAX_CACHE_SIZE: usize = 1_049_000;

/// Default largest response body eligible for caching
pub const DEFAULT_MAX_OBJECT_SIZE: usize = 102_400;
