//! Key Pattern Module
//!
//! Glob-style key patterns used for bulk invalidation. `*` matches any
//! sequence of characters, everything else matches literally.

use regex::Regex;

// == Key Pattern ==
/// A compiled glob pattern over cache keys.
#[derive(Debug, Clone)]
pub struct KeyPattern {
    regex: Regex,
}

impl KeyPattern {
    /// Compiles a glob into an anchored regex.
    ///
    /// Literal segments are escaped, so `posts.1` only matches `posts.1`.
    pub fn compile(pattern: &str) -> Result<Self, regex::Error> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        // (?s) lets `*` span newlines inside keys
        let regex = Regex::new(&format!("(?s)^{}$", body))?;
        Ok(Self { regex })
    }

    /// Returns true if the whole key matches the pattern.
    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}
