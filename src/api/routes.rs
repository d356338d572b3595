//! API Routes
//!
//! Configures the Axum router with all endpoints and their middleware
//! stack: CORS, request tracing, a catch-all panic stage, the general
//! admission limiter over the whole surface, the strict limiter over the
//! cache admin routes, and the response cache over the hello route.

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_clear_handler, cache_stats_handler, cache_test_handler, health_handler, hello_handler,
    root_handler, AppState,
};
use crate::error::ApiError;
use crate::middleware::rate_limit::{enforce, RateLimiter, RateScope};
use crate::middleware::response_cache::response_cache;

/// Creates the main router with all endpoints configured.
pub fn create_router(state: AppState) -> Router {
    let general = RateLimiter::new(RateScope::General, &state.config, state.store.clone());
    let strict = RateLimiter::new(RateScope::Strict, &state.config, state.store.clone());
    let production = state.config.is_production();

    let cache_routes = Router::new()
        .route("/stats", get(cache_stats_handler))
        .route("/clear", delete(cache_clear_handler))
        .route("/test", post(cache_test_handler))
        .layer(from_fn_with_state(strict, enforce));

    let hello_routes = Router::new()
        .route("/hello", get(hello_handler))
        .layer(from_fn_with_state(state.clone(), response_cache));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api", hello_routes)
        .nest("/api/cache", cache_routes)
        .layer(from_fn_with_state(general, enforce))
        .layer(cors_layer(state.config.cors_origins.as_deref()))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(
            move |err: Box<dyn std::any::Any + Send + 'static>| panic_response(err, production),
        ))
        .with_state(state)
}

/// Builds the CORS layer from the configured origin allowlist; with no
/// allowlist, any origin is accepted.
fn cors_layer(origins: Option<&[String]>) -> CorsLayer {
    let allow_origin = match origins {
        Some(origins) => AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok()),
        ),
        None => AllowOrigin::any(),
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Final catch-all stage: converts an uncaught handler panic into a 500
/// response with the standard error envelope. The panic detail is shown to
/// clients only outside production; it always reaches the log sink.
fn panic_response(err: Box<dyn std::any::Any + Send + 'static>, production: bool) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(%detail, "handler panicked");

    if production {
        ApiError::Internal("Internal Server Error".to_string()).into_response()
    } else {
        ApiError::Internal(detail).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::store::CacheStore;

    fn create_test_app() -> Router {
        let state = AppState::new(CacheStore::in_memory(), Config::default());
        create_router(state)
    }

    #[tokio::test]
    async fn test_root_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/cache/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_clear_without_pattern_is_rejected() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/cache/clear")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
