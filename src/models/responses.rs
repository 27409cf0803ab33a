//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheStats, EntrySummary};

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of successful inserts
    pub insertions: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Number of inserts rejected as too large
    pub rejections: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Bytes held by cached objects
    pub used_bytes: usize,
    /// Bytes still free
    pub remaining_bytes: usize,
    /// Total cache capacity in bytes
    pub capacity: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            insertions: stats.insertions,
            evictions: stats.evictions,
            rejections: stats.rejections,
            total_entries: stats.total_entries,
            used_bytes: stats.used_bytes,
            remaining_bytes: stats.remaining_bytes,
            capacity: stats.capacity,
        }
    }
}

/// Response body for the entry listing (GET /entries)
#[derive(Debug, Clone, Serialize)]
pub struct EntriesResponse {
    /// Entries from least to most recently used
    pub entries: Vec<EntrySummary>,
}

impl EntriesResponse {
    pub fn new(entries: Vec<EntrySummary>) -> Self {
        Self { entries }
    }
}

/// Response body for removing one entry (DELETE /entries?key=...)
#[derive(Debug, Clone, Serialize)]
pub struct RemoveResponse {
    /// Success message
    pub message: String,
    /// The key that was removed
    pub key: String,
}

impl RemoveResponse {
    /// Creates a new RemoveResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' removed successfully", key),
            key,
        }
    }
}

/// Response body for purging the cache (DELETE /entries/all)
#[derive(Debug, Clone, Serialize)]
pub struct PurgeResponse {
    /// Number of entries dropped
    pub removed: usize,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
