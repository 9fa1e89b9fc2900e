//! Cache Backend Trait
//!
//! The seam between the fetch-through coordinator and whatever stores its
//! blobs. The in-memory [`CacheStore`](super::CacheStore) is the production
//! implementation; tests plug in failing backends to exercise fail-open paths.

use async_trait::async_trait;

use crate::error::Result;

/// Storage operations the coordinator and bulk invalidation rely on.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the stored value, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Like `get`, but not counted as a lookup. Used when re-reading a key
    /// that was already looked up for the same request.
    async fn peek(&self, key: &str) -> Result<Option<String>> {
        self.get(key).await
    }

    /// Stores a value, replacing any previous one and its expiry.
    ///
    /// `None` or `Some(0)` means the value never expires.
    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<()>;

    /// Removes the given keys, returning how many actually existed.
    async fn delete(&self, keys: &[String]) -> Result<usize>;

    /// Lists live keys matching a glob pattern (`*` wildcard).
    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>>;
}
