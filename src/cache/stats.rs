//! Cache Statistics Module
//!
//! Tracks memoization metrics: hits, misses, expirations and failed calls.

use serde::Serialize;

// == Cache Stats ==
/// Tracks memoization metrics for one memoized function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Calls answered from the cache
    pub hits: u64,
    /// Calls that invoked the original function
    pub misses: u64,
    /// Entries found stale on lookup or removed by their timer
    pub expirations: u64,
    /// Calls whose result was an error and was not kept
    pub failures: u64,
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
    /// Returns hits / (hits + misses), or 0.0 if no calls have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Record Failure ==
    /// Increments the failure counter.
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }
}
