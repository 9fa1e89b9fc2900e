//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds used by fetch-through calls that don't pass one
    pub default_ttl: u64,
    /// TTL in seconds for the cached posts listing
    pub posts_ttl: u64,
    /// TTL in seconds for the cached users listing
    pub users_ttl: u64,
    /// Base URL of the upstream REST API
    pub upstream_url: String,
    /// Request timeout for upstream calls in seconds
    pub upstream_timeout: u64,
    /// Collapse concurrent misses on the same key into one upstream call
    pub single_flight: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DEFAULT_TTL` - Default fetch-through TTL in seconds (default: 3600)
    /// - `POSTS_TTL` - Posts cache TTL in seconds (default: 300)
    /// - `USERS_TTL` - Users cache TTL in seconds (default: 300)
    /// - `UPSTREAM_URL` - Upstream API base URL (default: jsonplaceholder)
    /// - `UPSTREAM_TIMEOUT_SECS` - Upstream request timeout (default: 10)
    /// - `SINGLE_FLIGHT` - `true`/`false`/`1`/`0` (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            posts_ttl: parse_var("POSTS_TTL").unwrap_or(defaults.posts_ttl),
            users_ttl: parse_var("USERS_TTL").unwrap_or(defaults.users_ttl),
            upstream_url: env::var("UPSTREAM_URL")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.upstream_url),
            upstream_timeout: parse_var("UPSTREAM_TIMEOUT_SECS")
                .unwrap_or(defaults.upstream_timeout),
            single_flight: env::var("SINGLE_FLIGHT")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.single_flight),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            default_ttl: 3600,
            posts_ttl: 300,
            users_ttl: 300,
            upstream_url: "https://jsonplaceholder.typicode.com".to_string(),
            upstream_timeout: 10,
            single_flight: true,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
