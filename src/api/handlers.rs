//! API Handlers
//!
//! HTTP request handlers for each endpoint.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    Json,
};
use tracing::info;

use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::models::{
    CacheTestRequest, ClearParams, ClearResponse, HealthResponse, HelloResponse, StatsResponse,
    TestResponse, WelcomeResponse,
};
use crate::store::{CacheStore, RESPONSE_CACHE_PREFIX, TEST_PREFIX};

/// Store key for the hello endpoint's visit counter.
const VISIT_COUNT_KEY: &str = "hello:visit_count";

/// Application state shared across all handlers.
///
/// Holds the long-lived handles built once at startup and passed into
/// every request-handling path.
#[derive(Clone)]
pub struct AppState {
    /// Cache store handle (Redis or in-process fallback)
    pub store: CacheStore,
    /// Server configuration
    pub config: Arc<Config>,
    /// Process start time, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new AppState around a store handle and configuration.
    pub fn new(store: CacheStore, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
            started_at: Instant::now(),
        }
    }
}

/// Handler for GET /
pub async fn root_handler() -> Json<WelcomeResponse> {
    Json(WelcomeResponse::new())
}

/// Handler for GET /health
///
/// Always reports 200: store degradation is advisory, not fatal.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = state.store.is_connected().await;
    Json(HealthResponse::new(
        state.store.backend_name(),
        connected,
        state.started_at.elapsed().as_secs(),
    ))
}

/// Handler for GET /api/hello
///
/// Demo endpoint with a store-backed visit counter. The route sits behind
/// the response cache, so repeated calls inside the TTL replay the first
/// response without touching the counter again.
pub async fn hello_handler(State(state): State<AppState>) -> Json<HelloResponse> {
    let visits = state.store.get::<u64>(VISIT_COUNT_KEY).await.unwrap_or(0) + 1;
    state.store.set(VISIT_COUNT_KEY, &visits, None).await;

    Json(HelloResponse::new(visits))
}

/// Handler for GET /api/cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(state.store.stats().await))
}

/// Handler for DELETE /api/cache/clear
///
/// Clears cached responses matching the given glob pattern, scoped to the
/// response cache namespace.
pub async fn cache_clear_handler(
    State(state): State<AppState>,
    Query(params): Query<ClearParams>,
) -> Result<Json<ClearResponse>> {
    let pattern = params
        .pattern
        .filter(|pattern| !pattern.is_empty())
        .ok_or_else(|| ApiError::Validation("Pattern is required".to_string()))?;

    let deleted = state
        .store
        .delete_pattern(&format!("{RESPONSE_CACHE_PREFIX}{pattern}"))
        .await;
    info!(%pattern, deleted, "cleared response cache entries");

    Ok(Json(ClearResponse::new(deleted)))
}

/// Handler for POST /api/cache/test
///
/// Round-trips a value through the store under the diagnostic namespace
/// and reports whether the read-back matches.
pub async fn cache_test_handler(
    State(state): State<AppState>,
    Json(req): Json<CacheTestRequest>,
) -> Result<Json<TestResponse>> {
    if let Some(message) = req.validate() {
        return Err(ApiError::Validation(message));
    }
    let value = req
        .value
        .ok_or_else(|| ApiError::Validation("Key and value are required".to_string()))?;

    let key = format!("{TEST_PREFIX}{}", req.key);
    state
        .store
        .set(&key, &value, Some(req.expiry.unwrap_or(300)))
        .await;
    let cached = state.store.get::<serde_json::Value>(&key).await;

    Ok(Json(TestResponse::new(value, cached)))
}
