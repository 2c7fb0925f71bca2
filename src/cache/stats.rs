//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, puts, creations
//! and evictions.

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time copy of the cache counters and size accounting.
///
/// Counters only ever grow for the lifetime of a cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of `get` calls that found a cached value
    pub hits: u64,
    /// Number of `get` calls that found nothing cached
    pub misses: u64,
    /// Number of `put` calls
    pub puts: u64,
    /// Number of values produced by the creation callback
    pub creates: u64,
    /// Number of entries evicted to satisfy the capacity bound
    pub evictions: u64,
    /// Accounted size of all entries
    pub size: i64,
    /// Capacity bound at the time of the snapshot
    pub max_size: i64,
    /// Number of entries at the time of the snapshot
    pub entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Hit Percent ==
    /// Whole-number hit percentage, rounded down.
    pub fn hit_percent(&self) -> u64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0
        } else {
            100 * self.hits / total
        }
    }

    // == Recorders ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_put(&mut self) {
        self.puts += 1;
    }

    pub fn record_create(&mut self) {
        self.creates += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
