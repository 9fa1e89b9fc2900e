//! Response DTOs for the API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::time::Duration;

use serde::Serialize;

use crate::cache::CacheStats;
use crate::fetch::CacheOutcome;

/// Timing and cache metadata attached to fetched resources
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchMeta {
    /// Wall-clock time of the fetch in milliseconds
    pub execution_time: f64,
    /// True when the data came straight from the cache
    pub cached: bool,
    /// "hit", "miss" or "bypassed"
    pub outcome: &'static str,
    /// When the response was built, RFC 3339
    pub timestamp: String,
}

impl FetchMeta {
    pub fn new(elapsed: Duration, outcome: CacheOutcome) -> Self {
        Self {
            execution_time: elapsed.as_micros() as f64 / 1000.0,
            cached: outcome == CacheOutcome::Hit,
            outcome: outcome.as_str(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for GET /api/posts and GET /api/users
#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse<T> {
    pub data: T,
    pub meta: FetchMeta,
}

impl<T> FetchResponse<T> {
    pub fn new(data: T, meta: FetchMeta) -> Self {
        Self { data, meta }
    }
}

/// Response body for POST /api/clear-cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearCacheResponse {
    /// Success message
    pub message: String,
    /// Pattern that was cleared
    pub pattern: String,
    /// Number of entries removed
    pub removed: usize,
}

impl ClearCacheResponse {
    pub fn new(pattern: impl Into<String>, removed: usize) -> Self {
        Self {
            message: "Cache cleared successfully".to_string(),
            pattern: pattern.into(),
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of entries removed by TTL
    pub expirations: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
