//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.
//!
//! Every handler takes the cache guard for exactly the cache calls it needs
//! and drops it before returning. Guards are never held across an `.await`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use tracing::debug;

use crate::cache::{millisecond_now, SharedCache};
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::metrics::render_text;
use crate::models::requests::{expire_after, validate_key};
use crate::models::{
    DeleteResponse, ExpireRequest, ExpireResponse, GetResponse, HealthResponse, IncrRequest,
    IncrResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Cache shared by all requests
    pub cache: Arc<SharedCache<String, String>>,
    /// TTL in seconds for writes without an explicit expiration
    pub default_ttl: u64,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: SharedCache<String, String>, default_ttl: u64) -> Self {
        Self {
            cache: Arc::new(cache),
            default_ttl,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(SharedCache::new(config.build_cache()), config.default_ttl)
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair. The expiration is `expire_at` if given, otherwise
/// `ttl` seconds from now, otherwise the default TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let expire_at = req.resolve_expire_at(millisecond_now(), state.default_ttl);
    let existed = state
        .cache
        .lock()
        .add(req.key.clone(), req.value, expire_at);

    Ok(Json(SetResponse::new(req.key, existed)))
}

/// Handler for GET /get/:key
///
/// Retrieves a live value. Missing and expired keys both answer 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value = state.cache.lock().get(key.as_str()).cloned();

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(ApiError::NotFound(key)),
    }
}

/// Handler for DELETE /del/:key
///
/// Removing an absent key is not an error.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.cache.lock().remove(key.as_str());

    Json(DeleteResponse::new(key))
}

/// Handler for PUT /expire/:key
///
/// Replaces the expiration of an existing key, leaving its value and recency
/// alone.
pub async fn expire_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<ExpireRequest>,
) -> Result<Json<ExpireResponse>> {
    let updated = state
        .cache
        .lock()
        .update_expiration(key.as_str(), req.expire_at);

    if !updated {
        return Err(ApiError::NotFound(key));
    }

    Ok(Json(ExpireResponse {
        key,
        expire_at: req.expire_at,
        updated,
    }))
}

/// Handler for POST /incr/:key
///
/// Reads the current integer (0 when missing or expired), adds `delta` and
/// writes it back, all under one cache guard so concurrent increments never
/// lose updates.
///
/// An empty body means `delta = 1` and the default TTL. A body that is present
/// must be a valid `IncrRequest`, otherwise nothing is written.
pub async fn incr_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Json<IncrResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let req = IncrRequest::from_body(&body).map_err(ApiError::InvalidRequest)?;
    let delta = req.delta.unwrap_or(1);
    let expire_at = expire_after(millisecond_now(), req.ttl.unwrap_or(state.default_ttl));

    let value = {
        let mut cache = state.cache.lock();

        let current = match cache.get(key.as_str()) {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                ApiError::InvalidRequest(format!("Value for key '{}' is not an integer", key))
            })?,
            None => 0,
        };
        let next = current.checked_add(delta).ok_or_else(|| {
            ApiError::InvalidRequest(format!("Increment of key '{}' overflows", key))
        })?;

        cache.add(key.clone(), next.to_string(), expire_at);
        next
    };

    debug!(key = %key, value, "incremented counter");
    Ok(Json(IncrResponse { key, value }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.lock();
    let response = StatsResponse::new(cache.stats(), cache.len(), cache.capacity());
    cache.release();

    Json(response)
}

/// Handler for GET /metrics
///
/// Serves the cache collector in the Prometheus text exposition format.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let body = render_text(state.cache.as_ref());

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
