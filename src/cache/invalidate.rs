//! Bulk Invalidation
//!
//! Removes every key matching a glob pattern from a backend.

use tracing::{info, warn};

use crate::cache::CacheBackend;

/// Deletes all keys matching `pattern` and returns how many were removed.
///
/// Never fails: no matches, an unparseable pattern and backend errors all
/// come back as zero removed.
pub async fn invalidate(backend: &dyn CacheBackend, pattern: &str) -> usize {
    let keys = match backend.keys_matching(pattern).await {
        Ok(keys) => keys,
        Err(e) => {
            warn!("Failed to list keys matching '{}': {}", pattern, e);
            return 0;
        }
    };

    if keys.is_empty() {
        return 0;
    }

    match backend.delete(&keys).await {
        Ok(removed) => {
            info!("Cleared {} cache entries matching {}", removed, pattern);
            removed
        }
        Err(e) => {
            warn!("Failed to delete keys matching '{}': {}", pattern, e);
            0
        }
    }
}
