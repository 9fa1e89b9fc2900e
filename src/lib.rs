//! Fetch Cache - request-level caching of upstream API responses
//!
//! An in-memory store with per-key TTL timers and glob invalidation, a
//! fail-open fetch-through coordinator on top of it, and a small HTTP
//! service that serves upstream data through the cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod tasks;
pub mod upstream;

pub use api::AppState;
pub use cache::{CacheBackend, CacheStore};
pub use config::Config;
pub use fetch::{CacheOutcome, FetchThrough};
