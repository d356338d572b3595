//! Key-Value Cache Store
//!
//! A fail-open caching layer over a remote Redis store, with an in-process
//! fallback backend carrying identical semantics. Callers must treat the
//! store as advisory: every operation degrades to a miss on failure and
//! never surfaces an error, except for the initial connection attempt.

mod handle;
mod memory;
mod redis;
mod stats;


// Re-export public types
pub use handle::{CacheStore, OtpEntry, StoreError, StoreStats};
pub use memory::MemoryStore;
pub use self::redis::RedisStore;
pub use stats::CacheStats;

// == Key Namespaces ==
/// Prefix for cached HTTP responses
pub const RESPONSE_CACHE_PREFIX: &str = "cache:";

/// Prefix for rate-limit counters
pub const RATE_LIMIT_PREFIX: &str = "rl:";

/// Prefix for diagnostic entries written by the cache test endpoint
pub const TEST_PREFIX: &str = "test:";

/// Prefix for one-time codes
pub const OTP_PREFIX: &str = "otp:";

/// Prefix for session payloads
pub const SESSION_PREFIX: &str = "session:";
