//! Response DTOs for the API
//!
//! Defines the structure of outgoing HTTP response bodies. Cache endpoints
//! share the `{success, message?, data?}` envelope; the welcome, hello,
//! and health endpoints keep their own ad hoc shapes.

use serde::Serialize;
use serde_json::Value;

use crate::store::StoreStats;

/// Response body for the root endpoint (GET /)
#[derive(Debug, Clone, Serialize)]
pub struct WelcomeResponse {
    /// Welcome message
    pub message: String,
    /// Crate version
    pub version: &'static str,
}

impl WelcomeResponse {
    pub fn new() -> Self {
        Self {
            message: "Welcome to the cachegate API!".to_string(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

impl Default for WelcomeResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (always "ok"; cache degradation is non-fatal)
    pub status: String,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
    /// Seconds since process start
    pub uptime_seconds: u64,
    /// Connected service states
    pub services: ServiceStatus,
}

/// Connected service states reported by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    /// Cache store connectivity ("connected" or "disconnected")
    pub cache: String,
    /// Active store backend ("redis" or "memory")
    pub backend: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with the current timestamp.
    pub fn new(backend: &str, connected: bool, uptime_seconds: u64) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_seconds,
            services: ServiceStatus {
                cache: if connected { "connected" } else { "disconnected" }.to_string(),
                backend: backend.to_string(),
            },
        }
    }
}

/// Response body for the hello endpoint (GET /api/hello)
#[derive(Debug, Clone, Serialize)]
pub struct HelloResponse {
    /// Greeting message
    pub message: String,
    /// Store-backed visit counter
    pub visit_count: u64,
    /// Current timestamp in RFC 3339 format
    pub timestamp: String,
}

impl HelloResponse {
    /// Creates a new HelloResponse for the given visit count.
    pub fn new(visit_count: u64) -> Self {
        Self {
            message: "Hello from the cachegate API!".to_string(),
            visit_count,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Response body for the cache stats endpoint (GET /api/cache/stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub data: StoreStats,
}

impl StatsResponse {
    pub fn new(data: StoreStats) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Response body for the cache clear endpoint (DELETE /api/cache/clear)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub success: bool,
    pub message: String,
    pub data: ClearData,
}

/// Payload of a clear response.
#[derive(Debug, Clone, Serialize)]
pub struct ClearData {
    /// Number of cache entries removed
    pub deleted_count: u64,
}

impl ClearResponse {
    /// Creates a new ClearResponse for the given deletion count.
    pub fn new(deleted_count: u64) -> Self {
        Self {
            success: true,
            message: format!("Cleared {} cache entries", deleted_count),
            data: ClearData { deleted_count },
        }
    }
}

/// Response body for the cache test endpoint (POST /api/cache/test)
#[derive(Debug, Clone, Serialize)]
pub struct TestResponse {
    pub success: bool,
    pub message: String,
    pub data: TestData,
}

/// Payload of a cache test response.
#[derive(Debug, Clone, Serialize)]
pub struct TestData {
    /// The value submitted by the client
    pub original: Value,
    /// The value read back from the store
    pub cached: Option<Value>,
    /// Whether the round-trip returned a deep-equal value
    #[serde(rename = "match")]
    pub matched: bool,
}

impl TestResponse {
    /// Creates a new TestResponse comparing the submitted value with the
    /// value read back from the store.
    pub fn new(original: Value, cached: Option<Value>) -> Self {
        let matched = cached.as_ref() == Some(&original);
        Self {
            success: true,
            message: if matched {
                "Cache test successful".to_string()
            } else {
                "Cache test value mismatch".to_string()
            },
            data: TestData {
                original,
                cached,
                matched,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_welcome_response_serialize() {
        let resp = WelcomeResponse::new();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("cachegate"));
        assert!(json.contains("version"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::new("memory", true, 42);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"cache\":\"connected\""));
        assert!(json.contains("\"backend\":\"memory\""));
        assert!(json.contains("\"uptime_seconds\":42"));
    }

    #[test]
    fn test_health_response_disconnected() {
        let resp = HealthResponse::new("redis", false, 0);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"cache\":\"disconnected\""));
    }

    #[test]
    fn test_hello_response_serialize() {
        let resp = HelloResponse::new(7);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"visit_count\":7"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_clear_response_serialize() {
        let resp = ClearResponse::new(3);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Cleared 3 cache entries"));
        assert!(json.contains("\"deleted_count\":3"));
    }

    #[test]
    fn test_test_response_match() {
        let resp = TestResponse::new(json!({"a": 1}), Some(json!({"a": 1})));
        assert!(resp.data.matched);
        let serialized = serde_json::to_string(&resp).unwrap();
        assert!(serialized.contains("\"match\":true"));
    }

    #[test]
    fn test_test_response_mismatch() {
        let resp = TestResponse::new(json!({"a": 1}), None);
        assert!(!resp.data.matched);
        assert!(resp.message.contains("mismatch"));
    }
}
