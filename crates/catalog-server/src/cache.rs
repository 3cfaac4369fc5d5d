//! In-memory TTL cache for master lists.
//!
//! Entries expire a fixed time after insertion and are evicted lazily, on the
//! next read of the same key. There is no capacity bound: keys are query
//! shapes, so cardinality stays low.

use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// Concurrent key → value store with per-entry expiration
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: DashMap<String, Entry<V>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache whose entries live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Get a value if it was stored less than `ttl` ago
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        if let Some(entry) = self.entries.get(key) {
            if entry.inserted_at.elapsed() < self.ttl {
                debug!(key = key, "Cache hit");
                return Some(entry.value.clone());
            }
            // Release the read guard before removing
            drop(entry);
            self.entries.remove(key);
            debug!(key = key, "Cache entry expired");
            return None;
        }

        debug!(key = key, "Cache miss");
        None
    }

    /// Store a value, replacing any previous entry and resetting its age
    pub fn set(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        debug!(key = %key, "Cache stored");
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of stored entries, expired ones included until read
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
