//! Cache Entry Module
//!
//! Defines a single cached response body.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Entry ==
/// One cached response body, keyed by request path.
///
/// The payload is copied in on creation and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    key: String,
    payload: Box<[u8]>,
    cached_at: DateTime<Utc>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry holding a private copy of `payload`.
    pub fn new(key: impl Into<String>, payload: &[u8]) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
            cached_at: Utc::now(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    pub fn cached_at(&self) -> DateTime<Utc> {
        self.cached_at
    }

    /// Metadata view used for listings.
    pub fn summary(&self) -> EntrySummary {
        EntrySummary {
            key: self.key.clone(),
            size: self.size(),
            cached_at: self.cached_at,
        }
    }
}

// == Entry Summary ==
/// Key and size of a cached entry, without its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub key: String,
    pub size: usize,
    pub cached_at: DateTime<Utc>,
}
