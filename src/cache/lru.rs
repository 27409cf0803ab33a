//! Recency List Module
//!
//! Ordered sequence of cache entries used for approximate LRU eviction.

use std::collections::VecDeque;

use crate::cache::CacheEntry;

// == Recency List ==
/// Entries ordered by recency of use.
///
/// Entries are stored in a VecDeque where:
/// - Front = Least recently used (next eviction candidate)
/// - Back = Most recently used
///
/// Lookups by key are linear scans; the list is bounded by the store's byte
/// capacity so it stays short.
#[derive(Debug, Default)]
pub struct RecencyList {
    entries: VecDeque<CacheEntry>,
}

impl RecencyList {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    // == Find ==
    /// Returns the entry with `key`, scanning from the LRU end.
    pub fn find(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.iter().find(|entry| entry.key() == key)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.key() == key)
    }

    // == Push Back ==
    /// Appends an entry as most recently used.
    pub fn push_back(&mut self, entry: CacheEntry) {
        self.entries.push_back(entry);
    }

    // == Pop Front ==
    /// Detaches and returns the least recently used entry.
    pub fn pop_front(&mut self) -> Option<CacheEntry> {
        self.entries.pop_front()
    }

    // == Take ==
    /// Detaches and returns the entry with `key`, leaving its neighbours in place.
    pub fn take(&mut self, key: &str) -> Option<CacheEntry> {
        let index = self.position(key)?;
        self.entries.remove(index)
    }

    // == Promote ==
    /// Moves the entry with `key` to the most recently used end.
    ///
    /// Returns false when no such entry exists.
    pub fn promote(&mut self, key: &str) -> bool {
        match self.take(key) {
            Some(entry) => {
                self.entries.push_back(entry);
                true
            }
            None => false,
        }
    }

    // == Peek Oldest ==
    /// Returns the least recently used entry without removing it.
    pub fn peek_oldest(&self) -> Option<&CacheEntry> {
        self.entries.front()
    }

    /// Iterates from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &CacheEntry> {
        self.entries.iter()
    }

    /// Drops every entry, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Contains ==
    /// Checks if an entry with `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.position(key).is_some()
    }
}
