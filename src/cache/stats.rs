//! Cache Statistics Module
//!
//! Tracks read-through performance and invalidation activity.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Calls answered from a live entry
    pub hits: u64,
    /// Calls that had to run the underlying fetch
    pub misses: u64,
    /// Underlying fetches that returned an error (never cached)
    pub fetch_errors: u64,
    /// Invalidation events processed
    pub invalidations: u64,
    /// Entries dropped to stay under capacity
    pub evictions: u64,
    /// Fetched values not stored because a tag was invalidated mid-fetch
    pub stale_discards: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_fetch_error(&mut self) {
        self.fetch_errors += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_stale_discard(&mut self) {
        self.stale_discards += 1;
    }

    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
