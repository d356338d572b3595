//! API Module
//!
//! HTTP handlers and routing for the backend surface.
//!
//! # Endpoints
//! - `GET /` - Welcome message
//! - `GET /health` - Health check with store status
//! - `GET /api/hello` - Demo endpoint with store-backed visit counter
//! - `GET /api/cache/stats` - Store statistics
//! - `DELETE /api/cache/clear?pattern=<glob>` - Clear cached responses
//! - `POST /api/cache/test` - Round-trip a value through the store

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
