//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap},
    Json,
};
use tracing::error;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::error::ApiError;
use crate::fetch::{measure, FetchThrough, Fetched, Timed};
use crate::models::{
    ClearCacheRequest, ClearCacheResponse, FetchMeta, FetchResponse, HealthResponse,
    StatsResponse,
};
use crate::upstream::{Post, UpstreamClient, UpstreamError, User};

/// Cache key for the posts listing
pub const POSTS_KEY: &str = "posts";
/// Cache key for the users listing
pub const USERS_KEY: &str = "users";

/// Application state shared across all handlers.
///
/// The store is created once here; the coordinator and the stats endpoint
/// both work on that same instance.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache store
    pub store: CacheStore,
    /// Fetch-through coordinator over `store`
    pub cache: Arc<FetchThrough>,
    /// Upstream API client
    pub upstream: UpstreamClient,
    /// TTL for the posts listing in seconds
    pub posts_ttl: u64,
    /// TTL for the users listing in seconds
    pub users_ttl: u64,
}

impl AppState {
    /// Creates a new AppState around an existing store.
    pub fn new(store: CacheStore, upstream: UpstreamClient, config: &Config) -> Self {
        let cache = FetchThrough::new(
            Arc::new(store.clone()),
            config.default_ttl,
            config.single_flight,
        );

        Self {
            store,
            cache: Arc::new(cache),
            upstream,
            posts_ttl: config.posts_ttl,
            users_ttl: config.users_ttl,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(
            config.upstream_url.clone(),
            Duration::from_secs(config.upstream_timeout),
        )?;

        Ok(Self::new(CacheStore::new(), upstream, config))
    }
}

/// Turns a timed fetch into a response, hiding upstream details from clients.
fn fetch_response<T>(
    timed: Timed<Result<Fetched<T>, UpstreamError>>,
    resource: &str,
) -> Result<Json<FetchResponse<T>>, ApiError> {
    match timed.value {
        Ok(fetched) => {
            let meta = FetchMeta::new(timed.elapsed, fetched.outcome);
            Ok(Json(FetchResponse::new(fetched.value, meta)))
        }
        Err(e) => {
            error!("Error fetching {}: {}", resource, e);
            Err(ApiError::Upstream(format!("Failed to fetch {}", resource)))
        }
    }
}

/// Handler for GET /api/posts
pub async fn posts_handler(
    State(state): State<AppState>,
) -> Result<Json<FetchResponse<Vec<Post>>>, ApiError> {
    let timed = measure(state.cache.fetch_with_outcome(
        POSTS_KEY,
        || state.upstream.fetch_posts(),
        Some(state.posts_ttl),
    ))
    .await;

    fetch_response(timed, "posts")
}

/// Handler for GET /api/users
pub async fn users_handler(
    State(state): State<AppState>,
) -> Result<Json<FetchResponse<Vec<User>>>, ApiError> {
    let timed = measure(state.cache.fetch_with_outcome(
        USERS_KEY,
        || state.upstream.fetch_users(),
        Some(state.users_ttl),
    ))
    .await;

    fetch_response(timed, "users")
}

/// Handler for POST /api/clear-cache
///
/// Clears keys matching the body's pattern, or everything without a body.
/// A body that isn't valid JSON is rejected rather than treated as absent.
pub async fn clear_cache_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ClearCacheResponse>, ApiError> {
    let req = ClearCacheRequest::from_body(has_json_content_type(&headers), &body)
        .map_err(ApiError::InvalidRequest)?;

    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let pattern = req.pattern();
    let removed = state.cache.invalidate(pattern).await;

    Ok(Json(ClearCacheResponse::new(pattern, removed)))
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim();
            mime.eq_ignore_ascii_case("application/json") || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.store.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
