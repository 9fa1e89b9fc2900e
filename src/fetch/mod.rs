//! Fetch Module
//!
//! Fetch-through caching on top of a [`CacheBackend`](crate::cache::CacheBackend),
//! plus the timing wrapper used to report latency.

mod coordinator;
mod single_flight;
mod timing;

pub use coordinator::{CacheOutcome, FetchThrough, Fetched};
pub use single_flight::{FlightGuard, SingleFlight};
pub use timing::{measure, Timed};
