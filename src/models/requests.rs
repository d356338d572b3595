//! Request DTOs for the API
//!
//! Defines the structure of incoming HTTP request bodies and query
//! parameters.

use serde::Deserialize;
use serde_json::Value;

/// Request body for the cache test endpoint (POST /api/cache/test)
///
/// # Fields
/// - `key`: diagnostic key, stored under the `test:` namespace
/// - `value`: any JSON value to round-trip through the store
/// - `expiry`: optional expiry in seconds (default: 300)
#[derive(Debug, Clone, Deserialize)]
pub struct CacheTestRequest {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub expiry: Option<u64>,
}

impl CacheTestRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() || self.value.is_none() {
            return Some("Key and value are required".to_string());
        }
        if self.key.len() > 256 {
            return Some("Key exceeds maximum length of 256 characters".to_string());
        }
        None
    }
}

/// Query parameters for the cache clear endpoint (DELETE /api/cache/clear)
#[derive(Debug, Clone, Deserialize)]
pub struct ClearParams {
    /// Glob pattern for keys to clear, applied under the `cache:` namespace
    #[serde(default)]
    pub pattern: Option<String>,
}
