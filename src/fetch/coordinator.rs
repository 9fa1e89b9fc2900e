//! Fetch-Through Coordinator
//!
//! Serves values from the cache when present, otherwise runs the producer
//! and stores what it returns. Cache failures never reach the caller: they
//! are logged and the producer's result is returned uncached.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{self, CacheBackend};
use crate::error::Result as CacheResult;
use crate::fetch::SingleFlight;

// == Outcome ==
/// Where a fetched value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Served from the cache; the producer was not called
    Hit,
    /// Produced and written to the cache
    Miss,
    /// Produced, but the cache could not be read or written
    Bypassed,
}

impl CacheOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Miss => "miss",
            CacheOutcome::Bypassed => "bypassed",
        }
    }
}

/// A value plus how it was obtained.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub outcome: CacheOutcome,
}

/// Result of consulting the backend before producing.
enum Lookup<T> {
    Hit(T),
    Miss,
    Unavailable,
}

// == Coordinator ==
/// Fetch-through front for a [`CacheBackend`].
pub struct FetchThrough {
    backend: Arc<dyn CacheBackend>,
    default_ttl: u64,
    single_flight: Option<SingleFlight>,
}

impl FetchThrough {
    // == Constructor ==
    /// Creates a coordinator.
    ///
    /// # Arguments
    /// * `backend` - Where serialized values are stored
    /// * `default_ttl` - TTL in seconds used when a call passes `None`
    /// * `single_flight` - Collapse concurrent misses on the same key
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: u64, single_flight: bool) -> Self {
        Self {
            backend,
            default_ttl,
            single_flight: single_flight.then(SingleFlight::new),
        }
    }

    // == Fetch Through ==
    /// Returns the cached value for `key`, or runs `producer` and caches its result.
    ///
    /// Producer errors are returned as-is and the producer is never retried.
    ///
    /// # Arguments
    /// * `key` - Cache key
    /// * `producer` - Called at most once, only on a miss or cache failure
    /// * `ttl_seconds` - `None` uses the default TTL, `Some(0)` never expires
    pub async fn fetch_through<T, E, F, Fut>(
        &self,
        key: &str,
        producer: F,
        ttl_seconds: Option<u64>,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.fetch_with_outcome(key, producer, ttl_seconds)
            .await
            .map(|fetched| fetched.value)
    }

    /// Same as [`fetch_through`](Self::fetch_through) but also reports
    /// whether the value was a hit, a miss, or bypassed the cache.
    pub async fn fetch_with_outcome<T, E, F, Fut>(
        &self,
        key: &str,
        producer: F,
        ttl_seconds: Option<u64>,
    ) -> Result<Fetched<T>, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.lookup(key, false).await {
            Lookup::Hit(value) => {
                return Ok(Fetched {
                    value,
                    outcome: CacheOutcome::Hit,
                })
            }
            Lookup::Unavailable => {
                let value = producer().await?;
                return Ok(Fetched {
                    value,
                    outcome: CacheOutcome::Bypassed,
                });
            }
            Lookup::Miss => {}
        }

        let _flight = match &self.single_flight {
            Some(flights) => {
                let guard = flights.acquire(key).await;
                // Someone ahead of us in the queue may have filled it.
                // This request's lookup was already counted.
                if let Lookup::Hit(value) = self.lookup(key, true).await {
                    return Ok(Fetched {
                        value,
                        outcome: CacheOutcome::Hit,
                    });
                }
                Some(guard)
            }
            None => None,
        };

        debug!("Cache miss for key: {}, fetching data...", key);
        let value = producer().await?;

        let ttl = ttl_seconds.unwrap_or(self.default_ttl);
        let outcome = if self.store(key, &value, ttl).await {
            CacheOutcome::Miss
        } else {
            CacheOutcome::Bypassed
        };

        Ok(Fetched { value, outcome })
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &str, recheck: bool) -> Lookup<T> {
        let read = if recheck {
            self.backend.peek(key).await
        } else {
            self.backend.get(key).await
        };

        let raw = match read {
            Ok(Some(raw)) => raw,
            Ok(None) => return Lookup::Miss,
            Err(e) => {
                warn!("Cache read failed for key '{}', fetching directly: {}", key, e);
                return Lookup::Unavailable;
            }
        };

        match decode(&raw) {
            Ok(value) => {
                debug!("Cache hit for key: {}", key);
                Lookup::Hit(value)
            }
            Err(e) => {
                warn!("Discarding unreadable cache entry '{}': {}", key, e);
                Lookup::Miss
            }
        }
    }

    /// Serializes and writes a value. Returns false if it could not be cached.
    async fn store<T: Serialize>(&self, key: &str, value: &T, ttl: u64) -> bool {
        let written = match encode(value) {
            Ok(raw) => self.backend.set(key, raw, Some(ttl)).await,
            Err(e) => Err(e),
        };

        match written {
            Ok(()) => true,
            Err(e) => {
                warn!("Cache write failed for key '{}': {}", key, e);
                false
            }
        }
    }

    // == Invalidation ==
    /// Removes every cached key matching a glob pattern. Never fails.
    pub async fn invalidate(&self, pattern: &str) -> usize {
        cache::invalidate(self.backend.as_ref(), pattern).await
    }

    /// Removes everything.
    pub async fn clear_all(&self) -> usize {
        self.invalidate("*").await
    }
}

fn encode<T: Serialize>(value: &T) -> CacheResult<String> {
    Ok(serde_json::to_string(value)?)
}

fn decode<T: DeserializeOwned>(raw: &str) -> CacheResult<T> {
    Ok(serde_json::from_str(raw)?)
}
