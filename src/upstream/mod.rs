//! Upstream API client
//!
//! Fetches the demo resources (posts and users) from a JSONPlaceholder-style
//! REST API. These calls are the producers handed to the fetch-through cache.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// A blog post as returned by the upstream API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

/// Stand-in titles and bodies for the placeholder lorem ipsum, picked by id.
const READABLE_POSTS: [(&str, &str); 6] = [
    (
        "How Response Caching Cuts Latency",
        "Serving repeated reads from memory skips the round trip to the upstream API entirely.",
    ),
    (
        "Choosing a TTL for API Responses",
        "Short TTLs keep data fresh, long ones save upstream calls. Most resources sit somewhere in between.",
    ),
    (
        "Invalidating Cache Entries by Pattern",
        "Namespaced keys like posts:1 let a single glob clear a whole family of entries at once.",
    ),
    (
        "Failing Open When the Cache Is Down",
        "A broken cache should slow requests down, not fail them. Reads and writes fall back to the source.",
    ),
    (
        "Collapsing Concurrent Misses",
        "When many requests miss the same key together, one upstream call can serve all of them.",
    ),
    (
        "Measuring Cache Hit Rates",
        "Hits, misses and expirations together show whether a cache is earning its memory.",
    ),
];

impl Post {
    /// Swaps the placeholder title and body for readable text, keyed by id.
    pub fn readable(self) -> Self {
        let (title, body) = READABLE_POSTS[(self.id % READABLE_POSTS.len() as u64) as usize];
        Self {
            title: title.to_string(),
            body: body.to_string(),
            ..self
        }
    }
}

/// A user as returned by the upstream API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
}

/// Errors that can occur when talking to the upstream API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP request failed or the body could not be decoded
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Failed to fetch {resource}: upstream returned {status}")]
    Status {
        resource: &'static str,
        status: StatusCode,
    },
}

/// Client for the upstream REST API
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    base_url: String,
}

impl UpstreamClient {
    /// Creates a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches all posts, with readable titles and bodies.
    pub async fn fetch_posts(&self) -> Result<Vec<Post>, UpstreamError> {
        let posts: Vec<Post> = self.fetch_json("posts").await?;
        Ok(posts.into_iter().map(Post::readable).collect())
    }

    /// Fetches all users.
    pub async fn fetch_users(&self) -> Result<Vec<User>, UpstreamError> {
        self.fetch_json("users").await
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        resource: &'static str,
    ) -> Result<T, UpstreamError> {
        let url = format!("{}/{}", self.base_url, resource);
        debug!("Fetching {} from {}", resource, url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                resource,
                status: response.status(),
            });
        }

        Ok(response.json::<T>().await?)
    }
}
