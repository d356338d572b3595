//! Cachegate - a thin HTTP backend with a store-backed caching layer
//!
//! Provides response caching, per-scope request admission limiting, and
//! cache diagnostic endpoints over a Redis-backed key-value store with an
//! in-process fallback.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use store::CacheStore;
pub use tasks::spawn_sweep_task;
