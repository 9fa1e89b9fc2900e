//! API Module
//!
//! HTTP handlers and routing for the demo service.
//!
//! # Endpoints
//! - `GET /api/posts` - Posts, served through the cache
//! - `GET /api/users` - Users, served through the cache
//! - `POST /api/clear-cache` - Invalidate cached entries by pattern
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
