//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored value, opaque to the store
    pub value: String,
    /// Expiration deadline, None = no expiration
    pub expires_at: Option<Instant>,
    /// Write stamp, unique per `set` on the owning store
    pub generation: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `expires_at` - Deadline; `None` means the entry never expires
    /// * `generation` - Write stamp used to match expiry timers to this write
    pub fn new(value: String, expires_at: Option<Instant>, generation: u64) -> Self {
        Self {
            value,
            expires_at,
            generation,
        }
    }

    // == Deadline ==
    /// Turns a TTL in seconds into a deadline counted from `now`.
    ///
    /// `0` never expires. So does a TTL too large for the clock to
    /// represent, rather than overflowing.
    pub fn deadline(now: Instant, ttl_seconds: u64) -> Option<Instant> {
        if ttl_seconds == 0 {
            return None;
        }
        now.checked_add(Duration::from_secs(ttl_seconds))
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its deadline.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Checks expiry against a caller-supplied instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Remaining TTL, saturating at zero. `None` if the entry never expires.
    #[cfg(test)]
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}
