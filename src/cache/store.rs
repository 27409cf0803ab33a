//! Cache Store Module
//!
//! Main cache engine combining the recency list with byte-capacity
//! accounting, all behind the admission gate.

use tracing::debug;

use crate::cache::{
    AdmissionGate, CacheCounters, CacheEntry, CacheStats, EntrySummary, RecencyList,
};
use crate::error::{CacheError, Result};

// == Store State ==
/// Everything the gate protects.
#[derive(Debug)]
struct StoreState {
    entries: RecencyList,
    /// total_capacity minus the size of every live entry
    remaining: usize,
}

impl StoreState {
    // == Evict ==
    /// Detaches the least recently used entry and reclaims its bytes.
    ///
    /// Caller must hold write access. Returns None when there is nothing left
    /// to evict.
    fn evict(&mut self) -> Option<CacheEntry> {
        let entry = self.entries.pop_front()?;
        self.remaining += entry.size();
        Some(entry)
    }

    fn take(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.take(key)?;
        self.remaining += entry.size();
        Some(entry)
    }
}

// == Cache Store ==
/// Fixed-capacity object cache shared by every proxy worker.
///
/// Lookups run concurrently under shared read access. Inserts, evictions and
/// promotions run one at a time under exclusive write access.
#[derive(Debug)]
pub struct CacheStore {
    state: AdmissionGate<StoreState>,
    counters: CacheCounters,
    total_capacity: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store holding at most `total_capacity` payload bytes.
    pub fn new(total_capacity: usize) -> Self {
        Self {
            state: AdmissionGate::new(StoreState {
                entries: RecencyList::new(),
                remaining: total_capacity,
            }),
            counters: CacheCounters::new(),
            total_capacity,
        }
    }

    // == Lookup ==
    /// Returns a copy of the payload cached under `key`, promoting it to most
    /// recently used.
    ///
    /// The scan runs under read access; promotion re-acquires write access
    /// and re-locates the entry. If a writer removed it in between, the
    /// lookup is a miss.
    pub fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        let Some(payload) = self.find_copy(key) else {
            self.counters.record_miss();
            return None;
        };
        self.revalidate(key, payload)
    }

    /// Copies the payload out under read access. Records nothing.
    fn find_copy(&self, key: &str) -> Option<Vec<u8>> {
        let state = self.state.read();
        state.entries.find(key).map(|entry| entry.payload().to_vec())
    }

    /// Promotes `key` and counts the hit, or counts a miss if the entry is
    /// no longer cached.
    fn revalidate(&self, key: &str, payload: Vec<u8>) -> Option<Vec<u8>> {
        if !self.promote(key) {
            debug!(key, "entry left the cache before promotion");
            self.counters.record_miss();
            return None;
        }

        self.counters.record_hit();
        Some(payload)
    }

    fn promote(&self, key: &str) -> bool {
        let mut state = self.state.write();
        state.entries.promote(key)
    }

    // == Insert ==
    /// Caches a copy of `payload` under `key` as most recently used.
    ///
    /// Any existing entry for `key` is replaced. Least recently used entries
    /// are evicted until the payload fits. Objects larger than the whole
    /// capacity are rejected without touching the current contents.
    ///
    /// The single-object limit is the caller's responsibility.
    pub fn insert(&self, key: impl Into<String>, payload: &[u8]) -> Result<()> {
        let size = payload.len();
        if size > self.total_capacity {
            self.counters.record_rejection();
            return Err(CacheError::TooLarge {
                size,
                capacity: self.total_capacity,
            });
        }

        let entry = CacheEntry::new(key, payload);

        let mut state = self.state.write();
        if let Some(previous) = state.take(entry.key()) {
            debug!(key = previous.key(), size = previous.size(), "replacing cached entry");
        }

        while state.remaining < size {
            match state.evict() {
                Some(evicted) => {
                    self.counters.record_eviction();
                    debug!(key = evicted.key(), size = evicted.size(), "evicted entry");
                }
                None => {
                    self.counters.record_rejection();
                    return Err(CacheError::TooLarge {
                        size,
                        capacity: self.total_capacity,
                    });
                }
            }
        }

        state.remaining -= size;
        state.entries.push_back(entry);
        self.counters.record_insertion();

        Ok(())
    }

    // == Evict ==
    /// Evicts the least recently used entry, returning its key.
    pub fn evict(&self) -> Option<String> {
        let evicted = self.state.write().evict()?;
        self.counters.record_eviction();
        debug!(key = evicted.key(), size = evicted.size(), "evicted entry");
        Some(evicted.key().to_string())
    }

    // == Remove ==
    /// Drops the entry cached under `key`. Returns false if there was none.
    pub fn remove(&self, key: &str) -> bool {
        self.state.write().take(key).is_some()
    }

    // == Clear ==
    /// Drops every entry, returning how many were removed.
    pub fn clear(&self) -> usize {
        let mut state = self.state.write();
        state.remaining = self.total_capacity;
        state.entries.clear()
    }

    // == Contains ==
    /// Checks for `key` without promoting it.
    pub fn contains(&self, key: &str) -> bool {
        self.state.read().entries.contains(key)
    }

    // == Entries ==
    /// Lists cached entries from least to most recently used.
    pub fn entries(&self) -> Vec<EntrySummary> {
        self.state
            .read()
            .entries
            .iter()
            .map(CacheEntry::summary)
            .collect()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (total_entries, used_bytes) = {
            let state = self.state.read();
            (state.entries.len(), self.total_capacity - state.remaining)
        };
        self.counters
            .snapshot(total_entries, used_bytes, self.total_capacity)
    }

    // == Capacity ==
    /// Bytes still available before eviction is needed.
    pub fn remaining_capacity(&self) -> usize {
        self.state.read().remaining
    }

    /// Bytes held by live entries.
    pub fn used_bytes(&self) -> usize {
        self.total_capacity - self.remaining_capacity()
    }

    pub fn total_capacity(&self) -> usize {
        self.total_capacity
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.state.read().entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.state.read().entries.is_empty()
    }

    // == Admission Counters ==
    /// Highest number of lookups observed scanning at the same time.
    pub fn peak_readers(&self) -> usize {
        self.state.peak_readers()
    }

    /// Highest number of writers observed inside the store at the same time.
    pub fn peak_writers(&self) -> usize {
        self.state.peak_writers()
    }
}
