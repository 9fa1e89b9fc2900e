//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with per-key TTL timers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::warn;

use crate::cache::{CacheBackend, CacheEntry, CacheStats, KeyPattern};
use crate::error::Result;
use crate::tasks::ExpiryTimer;

// == Store State ==
/// State behind the store's lock.
///
/// A key has a timer if and only if its entry has a deadline.
#[derive(Debug, Default)]
struct StoreState {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Pending expiry timers, one per key with a deadline
    timers: HashMap<String, ExpiryTimer>,
    /// Performance statistics
    stats: CacheStats,
    /// Last generation handed out by `set`
    generation: u64,
}

impl StoreState {
    /// Removes an entry and cancels its timer.
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        if let Some(timer) = self.timers.remove(key) {
            timer.cancel();
        }
        self.entries.remove(key)
    }

    /// Called by a firing timer. Only removes the entry the timer was armed for.
    fn expire(&mut self, key: &str, generation: u64) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.generation == generation => {
                self.entries.remove(key);
                // The firing timer's own handle; dropping it detaches the task
                self.timers.remove(key);
                self.stats.record_expiration();
                true
            }
            _ => false,
        }
    }
}

// == Cache Store ==
/// In-memory cache with per-key TTL expiry.
///
/// Cloning is cheap and every clone shares the same entries, so one store
/// is built at startup and handed to whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct CacheStore {
    state: Arc<RwLock<StoreState>>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// If the key already exists, the value is overwritten and any pending
    /// timer for it is cancelled before the new one is armed.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The serialized value
    /// * `ttl_seconds` - TTL in seconds; `None` or `Some(0)` never expires
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl_seconds: Option<u64>,
    ) {
        let key = key.into();
        let ttl_seconds = ttl_seconds.unwrap_or(0);
        let deadline = CacheEntry::deadline(Instant::now(), ttl_seconds);
        if ttl_seconds > 0 && deadline.is_none() {
            warn!(
                "TTL of {}s for key '{}' is out of range, storing without expiry",
                ttl_seconds, key
            );
        }

        let mut state = self.state.write().await;
        state.generation += 1;
        let generation = state.generation;

        if let Some(previous) = state.timers.remove(&key) {
            previous.cancel();
        }

        if let Some(deadline) = deadline {
            let timer = self.schedule_expiry(key.clone(), deadline, generation);
            state.timers.insert(key.clone(), timer);
        }

        state
            .entries
            .insert(key, CacheEntry::new(value.into(), deadline, generation));
    }

    /// Arms a timer holding only a weak reference, so pending timers never
    /// keep a dropped store alive.
    fn schedule_expiry(&self, key: String, deadline: Instant, generation: u64) -> ExpiryTimer {
        let state = Arc::downgrade(&self.state);
        let timer_key = key.clone();

        ExpiryTimer::spawn(key, deadline, async move {
            match state.upgrade() {
                Some(state) => state.write().await.expire(&timer_key, generation),
                None => false,
            }
        })
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Entries past their deadline whose timer hasn't run yet are removed
    /// here and reported as absent.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        match state.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let value = entry.value.clone();
                state.stats.record_hit();
                Some(value)
            }
            Some(_) => {
                state.remove(key);
                state.stats.record_expiration();
                state.stats.record_miss();
                None
            }
            None => {
                state.stats.record_miss();
                None
            }
        }
    }

    /// Reads a live value without touching stats or removing anything.
    pub async fn peek(&self, key: &str) -> Option<String> {
        let state = self.state.read().await;
        state
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    // == Delete ==
    /// Removes entries by key.
    ///
    /// Returns how many live entries were removed. Missing keys are skipped.
    pub async fn delete<K: AsRef<str>>(&self, keys: &[K]) -> usize {
        let mut state = self.state.write().await;
        let mut removed = 0;

        for key in keys {
            // Expired-but-unswept entries are dropped without being counted
            if let Some(entry) = state.remove(key.as_ref()) {
                if !entry.is_expired() {
                    removed += 1;
                }
            }
        }

        removed
    }

    // == Keys Matching ==
    /// Lists live keys matching a glob pattern, sorted.
    ///
    /// A pattern that fails to compile matches nothing.
    pub async fn keys_matching(&self, pattern: &str) -> Vec<String> {
        let compiled = match KeyPattern::compile(pattern) {
            Ok(compiled) => compiled,
            Err(e) => {
                warn!("Ignoring invalid key pattern '{}': {}", pattern, e);
                return Vec::new();
            }
        };

        let state = self.state.read().await;
        let now = Instant::now();

        let mut keys: Vec<String> = state
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired_at(now) && compiled.matches(key))
            .map(|(key, _)| key.clone())
            .collect();
        keys.sort();
        keys
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let state = self.state.read().await;
        state.stats.snapshot(state.entries.len())
    }

    // == Shutdown ==
    /// Cancels every pending expiry timer.
    ///
    /// Entries stay readable; ones whose deadline passes afterwards are
    /// dropped lazily by `get`. Returns the number of timers cancelled.
    pub async fn shutdown(&self) -> usize {
        let mut state = self.state.write().await;
        let cancelled = state.timers.len();

        for (_, timer) in state.timers.drain() {
            timer.cancel();
        }

        cancelled
    }

    // == Length ==
    /// Returns the current number of entries, including ones awaiting expiry.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }

    /// Number of armed expiry timers.
    pub async fn pending_timers(&self) -> usize {
        self.state.read().await.timers.len()
    }

    /// True when the timer map holds exactly the keys that have a deadline.
    #[cfg(test)]
    pub(crate) async fn timers_consistent(&self) -> bool {
        let state = self.state.read().await;
        let with_deadline = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.expires_at.is_some())
            .count();

        with_deadline == state.timers.len()
            && state.timers.keys().all(|key| {
                state
                    .entries
                    .get(key)
                    .is_some_and(|entry| entry.expires_at.is_some())
            })
    }
}

// == Backend Implementation ==
#[async_trait]
impl CacheBackend for CacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(CacheStore::get(self, key).await)
    }

    async fn peek(&self, key: &str) -> Result<Option<String>> {
        Ok(CacheStore::peek(self, key).await)
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: Option<u64>) -> Result<()> {
        CacheStore::set(self, key, value, ttl_seconds).await;
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        Ok(CacheStore::delete(self, keys).await)
    }

    async fn keys_matching(&self, pattern: &str) -> Result<Vec<String>> {
        Ok(CacheStore::keys_matching(self, pattern).await)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_store_new() {
        let store = CacheStore::new();
        assert_eq!(store.len().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_store_set_and_get() {
        let store = CacheStore::new();

        store.set("key1", "value1", Some(300)).await;

        assert_eq!(store.get("key1").await.as_deref(), Some("value1"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_store_get_nonexistent() {
        let store = CacheStore::new();
        assert!(store.get("nonexistent").await.is_none());
    }

    #[tokio::test]
    async fn test_store_delete_counts_removed_keys() {
        let store = CacheStore::new();

        store.set("key1", "value1", None).await;
        store.set("key2", "value2", Some(60)).await;

        let removed = store.delete(&["key1", "key2", "missing"]).await;

        assert_eq!(removed, 2);
        assert!(store.is_empty().await);
        assert_eq!(store.pending_timers().await, 0, "Delete must cancel timers");
    }

    #[tokio::test]
    async fn test_store_delete_nonexistent_is_noop() {
        let store = CacheStore::new();
        assert_eq!(store.delete(&["nonexistent"]).await, 0);
    }

    #[tokio::test]
    async fn test_store_overwrite() {
        let store = CacheStore::new();

        store.set("key1", "value1", None).await;
        store.set("key1", "value2", None).await;

        assert_eq!(store.get("key1").await.as_deref(), Some("value2"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_zero_or_missing_ttl_never_expires() {
        let store = CacheStore::new();

        store.set("forever", "v", None).await;
        store.set("also_forever", "v", Some(0)).await;

        assert_eq!(store.pending_timers().await, 0);
        sleep(Duration::from_millis(1100)).await;
        assert!(store.get("forever").await.is_some());
        assert!(store.get("also_forever").await.is_some());
    }

    #[tokio::test]
    async fn test_store_ttl_expiration() {
        let store = CacheStore::new();

        store.set("key1", "value1", Some(1)).await;
        assert!(store.get("key1").await.is_some());

        sleep(Duration::from_millis(1100)).await;

        assert!(store.get("key1").await.is_none());
    }

    #[tokio::test]
    async fn test_timer_removes_entry_without_read() {
        let store = CacheStore::new();

        store.set("write_once", "value", Some(1)).await;
        assert_eq!(store.pending_timers().await, 1);

        sleep(Duration::from_millis(1500)).await;

        // No get in between: the timer alone must have cleaned up
        assert_eq!(store.len().await, 0);
        assert_eq!(store.pending_timers().await, 0);
        assert_eq!(store.stats().await.expirations, 1);
    }

    #[tokio::test]
    async fn test_overwrite_cancels_old_timer() {
        let store = CacheStore::new();

        store.set("k", "v1", Some(1)).await;
        store.set("k", "v2", Some(100)).await;
        assert_eq!(store.pending_timers().await, 1);

        sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.get("k").await.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_overwrite_without_ttl_drops_timer() {
        let store = CacheStore::new();

        store.set("k", "v1", Some(1)).await;
        store.set("k", "v2", None).await;
        assert_eq!(store.pending_timers().await, 0);

        sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.get("k").await.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_stale_generation_does_not_expire() {
        let store = CacheStore::new();

        store.set("k", "v1", Some(100)).await;
        store.set("k", "v2", Some(100)).await;

        // A timer armed for the first write firing late must be a no-op
        let removed = store.state.write().await.expire("k", 1);
        assert!(!removed);
        assert_eq!(store.get("k").await.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_keys_matching() {
        let store = CacheStore::new();

        store.set("posts:1", "a", None).await;
        store.set("posts:2", "b", None).await;
        store.set("users:1", "c", None).await;

        assert_eq!(store.keys_matching("posts:*").await, vec!["posts:1", "posts:2"]);
        assert_eq!(store.keys_matching("*:1").await, vec!["posts:1", "users:1"]);
        assert_eq!(store.keys_matching("*").await.len(), 3);
        assert!(store.keys_matching("comments:*").await.is_empty());
    }

    #[tokio::test]
    async fn test_keys_matching_skips_expired() {
        let store = CacheStore::new();

        store.set("short", "a", Some(1)).await;
        store.set("long", "b", Some(100)).await;

        // Freeze the timer so only the deadline check applies
        store.shutdown().await;
        sleep(Duration::from_millis(1100)).await;

        assert_eq!(store.keys_matching("*").await, vec!["long"]);
    }

    #[tokio::test]
    async fn test_store_stats() {
        let store = CacheStore::new();

        store.set("key1", "value1", None).await;
        store.get("key1").await; // hit
        store.get("nonexistent").await; // miss

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_timers() {
        let store = CacheStore::new();

        store.set("a", "1", Some(1)).await;
        store.set("b", "2", Some(1)).await;
        store.set("c", "3", None).await;

        assert_eq!(store.shutdown().await, 2);
        assert_eq!(store.pending_timers().await, 0);

        sleep(Duration::from_millis(1500)).await;

        // Timers are gone, yet expired entries are still never served
        assert_eq!(store.len().await, 3);
        assert!(store.get("a").await.is_none());
        assert_eq!(store.get("c").await.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_timers_consistent_after_mixed_ops() {
        let store = CacheStore::new();

        store.set("a", "1", Some(30)).await;
        store.set("b", "2", None).await;
        store.set("a", "3", None).await;
        store.set("c", "4", Some(30)).await;
        store.delete(&["c"]).await;

        assert!(store.timers_consistent().await);
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_stores_without_expiry() {
        let store = CacheStore::new();

        store.set("k", "v", Some(u64::MAX)).await;

        assert_eq!(store.get("k").await.as_deref(), Some("v"));
        assert_eq!(store.pending_timers().await, 0);
        assert!(store.timers_consistent().await);
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_replaces_pending_timer() {
        let store = CacheStore::new();

        store.set("k", "old", Some(1)).await;
        store.set("k", "new", Some(u64::MAX)).await;

        sleep(Duration::from_millis(1500)).await;

        assert_eq!(store.get("k").await.as_deref(), Some("new"));
        assert!(store.timers_consistent().await);
    }

    #[tokio::test]
    async fn test_peek_does_not_count_lookups() {
        let store = CacheStore::new();
        store.set("k", "v", None).await;

        assert_eq!(store.peek("k").await.as_deref(), Some("v"));
        assert!(store.peek("missing").await.is_none());

        let stats = store.stats().await;
        assert_eq!(stats.lookups(), 0);
    }

    #[tokio::test]
    async fn test_peek_hides_expired_entries() {
        let store = CacheStore::new();
        store.set("k", "v", Some(1)).await;
        store.shutdown().await;

        sleep(Duration::from_millis(1100)).await;

        assert!(store.peek("k").await.is_none());
    }
}
