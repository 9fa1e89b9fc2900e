//! Cache Module
//!
//! Provides in-memory caching with per-key TTL expiry and glob-based
//! bulk invalidation.

mod backend;
mod entry;
mod invalidate;
mod pattern;
mod stats;
mod store;


// Re-export public types
pub use backend::CacheBackend;
pub use entry::CacheEntry;
pub use invalidate::invalidate;
pub use pattern::KeyPattern;
pub use stats::CacheStats;
pub use store::CacheStore;
