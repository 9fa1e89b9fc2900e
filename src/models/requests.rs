//! Request DTOs for the API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Pattern used when a clear request names none
pub const CLEAR_ALL_PATTERN: &str = "*";

/// Request body for POST /api/clear-cache
///
/// # Fields
/// - `pattern`: Optional glob over cache keys (clears everything if absent)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClearCacheRequest {
    /// Glob pattern, `*` matches any sequence of characters
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ClearCacheRequest {
    /// Parses a raw request body.
    ///
    /// A blank body means "clear everything". Anything else must be JSON
    /// and sent as such; it is never silently replaced by the default.
    pub fn from_body(is_json: bool, body: &[u8]) -> Result<Self, String> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        if !is_json {
            return Err("Expected request with `Content-Type: application/json`".to_string());
        }
        serde_json::from_slice(body).map_err(|e| format!("Invalid request body: {}", e))
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match &self.pattern {
            Some(pattern) if pattern.is_empty() => Some("Pattern cannot be empty".to_string()),
            _ => None,
        }
    }

    /// The pattern to clear, defaulting to everything.
    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or(CLEAR_ALL_PATTERN)
    }
}
