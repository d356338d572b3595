//! Response Cache Interceptor
//!
//! Cache-aside middleware for idempotent reads. GET responses are replayed
//! byte-for-byte from the store while present; on a miss the downstream
//! handler runs and its successful response body is captured into the store
//! by a detached task, so the write never delays or fails the response.
//!
//! Consistency is eventual: a request racing the detached write can itself
//! miss and recompute.

use axum::{
    body::{to_bytes, Body},
    extract::{OriginalUri, Request, State},
    http::{header, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::api::AppState;
use crate::error::ApiError;
use crate::store::RESPONSE_CACHE_PREFIX;

/// Middleware entry point; layered over cacheable routes via
/// `from_fn_with_state`.
///
/// The cache key is derived from the full request path and query string, so
/// distinct query parameters cache independently. Only success responses
/// are stored; error bodies pass through uncached.
pub async fn response_cache(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    // Only idempotent reads participate
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    // Nested routers strip their prefix from the request URI; key off the
    // original so the namespace reflects the public path
    let uri = req
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| req.uri().clone());
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    let key = format!("{RESPONSE_CACHE_PREFIX}{path_and_query}");

    if let Some(cached) = state.store.get::<String>(&key).await {
        debug!(%key, "response cache hit");
        return ([(header::CONTENT_TYPE, "application/json")], cached).into_response();
    }

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(%key, %err, "failed to buffer response body");
            return ApiError::Internal("failed to buffer response body".to_string())
                .into_response();
        }
    };

    if parts.status.is_success() {
        if let Ok(payload) = String::from_utf8(bytes.to_vec()) {
            let store = state.store.clone();
            let ttl = state.config.response_cache_ttl;
            // Detached write: failures reach the log sink, never the caller
            tokio::spawn(async move {
                if !store.set(&key, &payload, Some(ttl)).await {
                    error!(%key, "failed to cache response");
                }
            });
        }
    }

    Response::from_parts(parts, Body::from(bytes))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        middleware::from_fn_with_state,
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::store::CacheStore;

    fn test_app(hits: Arc<AtomicU64>) -> (Router, AppState) {
        let state = AppState::new(CacheStore::in_memory(), Config::default());

        let handler_hits = hits.clone();
        let failing_hits = hits.clone();
        let app = Router::new()
            .route(
                "/counted",
                get(move || {
                    let hits = handler_hits.clone();
                    async move {
                        let n = hits.fetch_add(1, Ordering::SeqCst) + 1;
                        Json(json!({ "calls": n }))
                    }
                }),
            )
            .route(
                "/failing",
                get(move || {
                    let hits = failing_hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        (StatusCode::INTERNAL_SERVER_ERROR, "boom")
                    }
                }),
            )
            .route("/echo", post(|body: String| async move { body }))
            .layer(from_fn_with_state(state.clone(), response_cache));

        (app, state)
    }

    async fn fetch(app: &Router, method: &str, uri: &str) -> (StatusCode, String) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let hits = Arc::new(AtomicU64::new(0));
        let (app, _state) = test_app(hits.clone());

        let (status, first) = fetch(&app, "GET", "/counted").await;
        assert_eq!(status, StatusCode::OK);

        // Let the detached write land
        tokio::time::sleep(Duration::from_millis(100)).await;

        let (status, second) = fetch(&app, "GET", "/counted").await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(first, second);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_queries_cache_independently() {
        let hits = Arc::new(AtomicU64::new(0));
        let (app, _state) = test_app(hits.clone());

        fetch(&app, "GET", "/counted?page=1").await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        fetch(&app, "GET", "/counted?page=2").await;
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(hits.load(Ordering::SeqCst), 2);

        // Both entries are now replayed without handler invocations
        fetch(&app, "GET", "/counted?page=1").await;
        fetch(&app, "GET", "/counted?page=2").await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_responses_are_not_cached() {
        let hits = Arc::new(AtomicU64::new(0));
        let (app, state) = test_app(hits.clone());

        let (status, _) = fetch(&app, "GET", "/failing").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let cached: Option<String> = state.store.get("cache:/failing").await;
        assert!(cached.is_none());

        // Handler runs again since nothing was stored
        fetch(&app, "GET", "/failing").await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_get_requests_bypass_the_cache() {
        let hits = Arc::new(AtomicU64::new(0));
        let (app, state) = test_app(hits);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from("payload"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        tokio::time::sleep(Duration::from_millis(100)).await;
        let cached: Option<String> = state.store.get("cache:/echo").await;
        assert!(cached.is_none());
    }
}
