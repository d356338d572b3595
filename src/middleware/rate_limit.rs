//! Request Admission Limiter
//!
//! Fixed-window request counting per client address, backed by the cache
//! store. Each scope carries its own window, ceiling, and rejection
//! message; limiters are built once at startup and carried in router
//! state rather than materialized lazily per request.
//!
//! When the store handle is the in-process fallback, counters are
//! process-local with the same window semantics. Runtime store faults
//! admit the request rather than block traffic.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::config::Config;
use crate::error::ApiError;
use crate::store::{CacheStore, RATE_LIMIT_PREFIX};

// == Rate Scope ==
/// Limiter scopes, each configured independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateScope {
    /// Whole API surface: 100 requests per 15 minutes (env-overridable)
    General,
    /// Sensitive routes: 20 requests per 15 minutes
    Strict,
    /// Authentication attempts: 5 requests per 15 minutes
    Auth,
    /// One-time code issuance: 3 requests per 60 minutes
    Otp,
}

impl RateScope {
    /// Key segment used in store counters.
    pub fn prefix(self) -> &'static str {
        match self {
            RateScope::General => "general",
            RateScope::Strict => "strict",
            RateScope::Auth => "auth",
            RateScope::Otp => "otp",
        }
    }

    /// Rejection message returned to the client.
    pub fn message(self) -> &'static str {
        match self {
            RateScope::General => "Too many requests from this IP, please try again later.",
            RateScope::Strict => "Too many requests, please slow down.",
            RateScope::Auth => "Too many authentication attempts, please try again later.",
            RateScope::Otp => "Too many OTP requests, please try again later.",
        }
    }
}

// == Rate Limiter ==
/// A single admission limiter with a fixed window and ceiling.
#[derive(Clone)]
pub struct RateLimiter {
    scope: RateScope,
    window_seconds: u64,
    max_requests: u64,
    store: CacheStore,
}

impl RateLimiter {
    /// Builds the limiter for a scope. Only the general scope honors the
    /// environment overrides; the others use their fixed ceilings.
    pub fn new(scope: RateScope, config: &Config, store: CacheStore) -> Self {
        let (window_ms, max_requests) = match scope {
            RateScope::General => (config.rate_limit_window_ms, config.rate_limit_max),
            RateScope::Strict => (15 * 60 * 1000, 20),
            RateScope::Auth => (15 * 60 * 1000, 5),
            RateScope::Otp => (60 * 60 * 1000, 3),
        };
        Self {
            scope,
            window_seconds: (window_ms / 1000).max(1),
            max_requests,
            store,
        }
    }

    /// Counts one request for `client` and decides admission.
    pub async fn check(&self, client: &str) -> Result<(), ApiError> {
        let key = format!("{}{}:{}", RATE_LIMIT_PREFIX, self.scope.prefix(), client);
        match self.store.incr_window(&key, self.window_seconds).await {
            Some(count) if count > self.max_requests => {
                warn!(client, scope = self.scope.prefix(), "rate limit exceeded");
                Err(ApiError::RateLimited(self.scope.message().to_string()))
            }
            Some(_) => Ok(()),
            None => {
                // Counter unavailable: admit rather than block traffic
                warn!(client, "rate limit counter unavailable, admitting request");
                Ok(())
            }
        }
    }
}

/// Middleware entry point; layered per scope via `from_fn_with_state`.
pub async fn enforce(
    State(limiter): State<RateLimiter>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let client = client_addr(&req);
    limiter.check(&client).await?;
    Ok(next.run(req).await)
}

/// Best-effort client identity: forwarded headers first, then the
/// connection's peer address.
fn client_addr(req: &Request) -> String {
    for name in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = req.headers().get(name).and_then(|v| v.to_str().ok()) {
            if let Some(first) = value.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
