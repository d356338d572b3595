//! Request-Processing Stages
//!
//! Middleware applied ahead of route handlers: per-scope request admission
//! limiting and cache-aside response caching for idempotent reads.

pub mod rate_limit;
pub mod response_cache;

pub use rate_limit::{RateLimiter, RateScope};
pub use response_cache::response_cache;
