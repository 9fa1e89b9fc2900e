//! Cache Statistics Module
//!
//! Lookup and expiry counters kept by the store.

use serde::Serialize;

/// Counters for store lookups and timer expirations.
///
/// `total_entries` is filled in when a snapshot is taken; the store does not
/// keep it up to date between calls to [`CacheStats::snapshot`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    /// Lookups that found nothing or an entry past its deadline
    pub misses: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    pub total_entries: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total lookups served, hit or miss.
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups that were hits; 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            n => self.hits as f64 / n as f64,
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    /// Copies the counters, stamping the current entry count.
    pub fn snapshot(&self, total_entries: usize) -> Self {
        Self {
            total_entries,
            ..*self
        }
    }
}
