//! Background Tasks Module
//!
//! Contains tasks that run outside the request path.
//!
//! # Tasks
//! - TTL Expiry: one timer per key, removes the entry when its TTL elapses

mod expiry;

pub use expiry::ExpiryTimer;
