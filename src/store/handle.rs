//! Cache Store Handle
//!
//! The store handle callers actually hold. Dispatches to the Redis backend
//! or the in-process fallback picked at construction time; callers stay
//! oblivious to which one is active.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::config::Config;
use crate::store::{CacheStats, MemoryStore, RedisStore, OTP_PREFIX, SESSION_PREFIX};

// == Store Error ==
/// Error surfaced by the initial connection attempt. Everything past
/// construction fails open instead.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store unreachable after the retry ceiling
    #[error("connection failed after {attempts} attempts: {source}")]
    Connection {
        attempts: u32,
        #[source]
        source: redis::RedisError,
    },
}

// == Store Stats ==
/// Backend status snapshot for the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    /// Whether the backend currently answers probes
    pub connected: bool,
    /// Active backend name ("redis" or "memory")
    pub backend: &'static str,
    /// Raw statistics section from the remote store, when active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    /// Hit/miss counters from the in-process backend, when active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counters: Option<CacheStats>,
}

// == OTP Entry ==
/// One-time code payload stored under the `otp:` namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpEntry {
    /// The code itself
    pub otp: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

// == Cache Store ==
/// Key-value cache store with JSON serialization and TTL.
///
/// All operations are advisory: on any backend fault they log and return
/// a miss-equivalent (`None` / `false` / `0`) rather than an error.
#[derive(Clone)]
pub struct CacheStore {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Redis(RedisStore),
    Memory(MemoryStore),
}

impl CacheStore {
    // == Constructors ==
    /// Connects to the Redis backend described by the configuration.
    ///
    /// Fails with [`StoreError::Connection`] once the retry ceiling is
    /// exceeded; the caller decides whether to fall back to
    /// [`CacheStore::in_memory`].
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let store = RedisStore::connect(&config.redis_url(), config.redis_max_retries).await?;
        Ok(Self {
            backend: Backend::Redis(store),
        })
    }

    /// Creates a store backed by in-process memory.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryStore::new()),
        }
    }

    /// True when running on the in-process fallback.
    pub fn is_fallback(&self) -> bool {
        matches!(self.backend, Backend::Memory(_))
    }

    /// Name of the active backend.
    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Redis(_) => "redis",
            Backend::Memory(_) => "memory",
        }
    }

    // == Set ==
    /// Serializes `value` to JSON and writes it, with expiry when a TTL is
    /// given. Returns false on serialization or backend failure.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(err) => {
                error!(key, %err, "failed to serialize cache value");
                return false;
            }
        };
        match &self.backend {
            Backend::Redis(store) => store.set(key, payload, ttl_seconds).await,
            Backend::Memory(store) => store.set(key, payload, ttl_seconds).await,
        }
    }

    // == Get ==
    /// Reads and deserializes a value; absent, expired, errored, and
    /// malformed entries all come back as `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let payload = match &self.backend {
            Backend::Redis(store) => store.get(key).await,
            Backend::Memory(store) => store.get(key).await,
        }?;
        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(key, %err, "failed to deserialize cache value");
                None
            }
        }
    }

    // == Delete ==
    /// Removes a key; false only on backend failure.
    pub async fn delete(&self, key: &str) -> bool {
        match &self.backend {
            Backend::Redis(store) => store.delete(key).await,
            Backend::Memory(store) => store.delete(key).await,
        }
    }

    /// Removes all keys matching a glob pattern.
    ///
    /// Returns the number of keys removed, 0 on error.
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        match &self.backend {
            Backend::Redis(store) => store.delete_pattern(pattern).await,
            Backend::Memory(store) => store.delete_pattern(pattern).await,
        }
    }

    // == Exists ==
    /// Checks key presence; false on error.
    pub async fn exists(&self, key: &str) -> bool {
        match &self.backend {
            Backend::Redis(store) => store.exists(key).await,
            Backend::Memory(store) => store.exists(key).await,
        }
    }

    // == Window Counter ==
    /// Increments a fixed-window counter keyed for rate limiting.
    ///
    /// Returns the post-increment count, or `None` on backend failure so
    /// callers can fail open.
    pub async fn incr_window(&self, key: &str, window_seconds: u64) -> Option<u64> {
        match &self.backend {
            Backend::Redis(store) => store.incr_window(key, window_seconds).await,
            Backend::Memory(store) => store.incr_window(key, window_seconds).await,
        }
    }

    // == Flush ==
    /// Clears the entire store.
    pub async fn flush_all(&self) -> bool {
        match &self.backend {
            Backend::Redis(store) => store.flush_all().await,
            Backend::Memory(store) => store.flush_all().await,
        }
    }

    // == Maintenance ==
    /// Removes expired entries from the in-process backend.
    ///
    /// The remote backend expires keys natively, so this is a no-op there.
    pub async fn cleanup_expired(&self) -> usize {
        match &self.backend {
            Backend::Redis(_) => 0,
            Backend::Memory(store) => store.cleanup_expired().await,
        }
    }

    /// Whether the backend currently answers probes.
    pub async fn is_connected(&self) -> bool {
        match &self.backend {
            Backend::Redis(store) => store.ping().await,
            Backend::Memory(_) => true,
        }
    }

    /// Backend status snapshot for the stats endpoint.
    pub async fn stats(&self) -> StoreStats {
        match &self.backend {
            Backend::Redis(store) => StoreStats {
                connected: store.ping().await,
                backend: "redis",
                info: store.info().await,
                counters: None,
            },
            Backend::Memory(store) => StoreStats {
                connected: true,
                backend: "memory",
                info: None,
                counters: Some(store.stats().await),
            },
        }
    }

    // == One-Time Codes ==
    /// Stores a one-time code under the `otp:` namespace.
    pub async fn set_otp(&self, identifier: &str, otp: &str, expiry_minutes: u64) -> bool {
        let entry = OtpEntry {
            otp: otp.to_string(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };
        let key = format!("{OTP_PREFIX}{identifier}");
        self.set(&key, &entry, Some(expiry_minutes * 60)).await
    }

    /// Reads a one-time code.
    pub async fn get_otp(&self, identifier: &str) -> Option<OtpEntry> {
        self.get(&format!("{OTP_PREFIX}{identifier}")).await
    }

    /// Removes a one-time code.
    pub async fn delete_otp(&self, identifier: &str) -> bool {
        self.delete(&format!("{OTP_PREFIX}{identifier}")).await
    }

    // == Sessions ==
    /// Stores a session payload under the `session:` namespace.
    pub async fn set_session<T: Serialize>(
        &self,
        session_id: &str,
        data: &T,
        expiry_seconds: u64,
    ) -> bool {
        let key = format!("{SESSION_PREFIX}{session_id}");
        self.set(&key, data, Some(expiry_seconds)).await
    }

    /// Reads a session payload.
    pub async fn get_session<T: DeserializeOwned>(&self, session_id: &str) -> Option<T> {
        self.get(&format!("{SESSION_PREFIX}{session_id}")).await
    }

    /// Removes a session payload.
    pub async fn delete_session(&self, session_id: &str) -> bool {
        self.delete(&format!("{SESSION_PREFIX}{session_id}")).await
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_json_roundtrip() {
        let store = CacheStore::in_memory();

        let value = json!({"a": 1, "nested": {"b": [1, 2, 3]}});
        assert!(store.set("test:k1", &value, None).await);

        let cached: Option<Value> = store.get("test:k1").await;
        assert_eq!(cached, Some(value));
    }

    #[tokio::test]
    async fn test_delete_then_get_misses() {
        let store = CacheStore::in_memory();

        store.set("test:k1", &json!({"a": 1}), None).await;
        assert!(store.delete("test:k1").await);

        let cached: Option<Value> = store.get("test:k1").await;
        assert_eq!(cached, None);
    }

    #[tokio::test]
    async fn test_get_type_mismatch_is_a_miss() {
        let store = CacheStore::in_memory();

        store.set("test:text", &"not a number", None).await;
        let cached: Option<u64> = store.get("test:text").await;
        assert_eq!(cached, None);
    }

    #[tokio::test]
    async fn test_backend_reporting() {
        let store = CacheStore::in_memory();
        assert!(store.is_fallback());
        assert_eq!(store.backend_name(), "memory");
        assert!(store.is_connected().await);

        let stats = store.stats().await;
        assert!(stats.connected);
        assert_eq!(stats.backend, "memory");
        assert!(stats.info.is_none());
        assert!(stats.counters.is_some());
    }

    #[tokio::test]
    async fn test_otp_helpers() {
        let store = CacheStore::in_memory();

        assert!(store.set_otp("user@example.com", "123456", 10).await);
        let entry = store.get_otp("user@example.com").await.unwrap();
        assert_eq!(entry.otp, "123456");
        assert!(entry.created_at > 0);

        assert!(store.delete_otp("user@example.com").await);
        assert!(store.get_otp("user@example.com").await.is_none());
    }

    #[tokio::test]
    async fn test_session_helpers() {
        let store = CacheStore::in_memory();

        let data = json!({"user_id": 7, "role": "tutor"});
        assert!(store.set_session("sess-1", &data, 86_400).await);

        let cached: Option<Value> = store.get_session("sess-1").await;
        assert_eq!(cached, Some(data));

        assert!(store.delete_session("sess-1").await);
        let cached: Option<Value> = store.get_session("sess-1").await;
        assert_eq!(cached, None);
    }

    #[tokio::test]
    async fn test_flush_all_clears_everything() {
        let store = CacheStore::in_memory();

        store.set("a", &1, None).await;
        store.set("b", &2, None).await;
        assert!(store.flush_all().await);

        let cached: Option<u64> = store.get("a").await;
        assert_eq!(cached, None);
    }
}
