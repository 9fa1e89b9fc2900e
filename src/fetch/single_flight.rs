//! Per-key miss serialization.
//!
//! Concurrent misses on one key queue behind a per-key async mutex. The
//! first caller fills the cache; the ones behind it re-check and hit.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type FlightMap = Mutex<HashMap<String, Arc<AsyncMutex<()>>>>;

/// Registry of in-flight fetches keyed by cache key.
#[derive(Debug, Default)]
pub struct SingleFlight {
    flights: FlightMap,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds the flight for `key`.
    pub async fn acquire(&self, key: &str) -> FlightGuard<'_> {
        let lock = {
            let mut flights = self.flights.lock();
            flights.entry(key.to_string()).or_default().clone()
        };

        let guard = lock.clone().lock_owned().await;

        FlightGuard {
            flights: &self.flights,
            key: key.to_string(),
            lock,
            guard: Some(guard),
        }
    }

    /// Number of keys with a flight in progress or queued.
    #[cfg(test)]
    pub fn in_flight(&self) -> usize {
        self.flights.lock().len()
    }
}

/// Held while a caller fetches a key. Dropping it lets the next waiter in
/// and forgets the key once nobody is queued on it.
#[derive(Debug)]
pub struct FlightGuard<'a> {
    flights: &'a FlightMap,
    key: String,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        // Release first so the count below only sees the map and `self.lock`
        drop(self.guard.take());

        let mut flights = self.flights.lock();
        if Arc::strong_count(&self.lock) == 2 {
            flights.remove(&self.key);
        }
    }
}
