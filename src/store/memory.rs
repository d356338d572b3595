//! In-Process Store Backend
//!
//! Fallback backend used when the Redis store is unreachable at startup.
//! Carries the same surface as the Redis backend: serialized-JSON payloads,
//! millisecond-granularity expiry, glob-style pattern deletion, and window
//! counters. State is scoped to a single process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::RwLock;

use crate::store::CacheStats;

// == Memory Entry ==
/// A single stored payload with optional expiry.
#[derive(Debug, Clone)]
struct MemoryEntry {
    /// Serialized JSON payload
    payload: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<u64>,
}

impl MemoryEntry {
    fn new(payload: String, ttl_seconds: Option<u64>) -> Self {
        let expires_at = ttl_seconds.map(|ttl| current_timestamp_ms() + ttl * 1000);
        Self {
            payload,
            expires_at,
        }
    }

    /// An entry is expired once the current time reaches its expiry stamp.
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }
}

/// Returns current Unix timestamp in milliseconds.
fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Memory Store ==
/// In-process key-value store with TTL support.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, MemoryEntry>,
    stats: CacheStats,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a serialized payload with optional TTL.
    ///
    /// Overwrites any existing entry and resets its expiry.
    pub async fn set(&self, key: &str, payload: String, ttl_seconds: Option<u64>) -> bool {
        let mut inner = self.inner.write().await;
        inner
            .entries
            .insert(key.to_string(), MemoryEntry::new(payload, ttl_seconds));
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        true
    }

    /// Retrieves a payload by key, removing it if expired.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut inner = self.inner.write().await;
        match inner.entries.get(key) {
            Some(entry) if entry.is_expired() => {
                inner.entries.remove(key);
                let count = inner.entries.len();
                inner.stats.set_total_entries(count);
                inner.stats.record_miss();
                None
            }
            Some(entry) => {
                let payload = entry.payload.clone();
                inner.stats.record_hit();
                Some(payload)
            }
            None => {
                inner.stats.record_miss();
                None
            }
        }
    }

    /// Removes an entry. Returns true whether or not the key existed,
    /// matching the remote backend's no-error semantics.
    pub async fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.write().await;
        inner.entries.remove(key);
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        true
    }

    /// Removes all live entries whose key matches a glob pattern.
    ///
    /// Returns the number of entries removed. Only `*` wildcards are
    /// supported, matching the remote backend's `KEYS` usage here.
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        let mut inner = self.inner.write().await;
        let matching: Vec<String> = inner
            .entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && glob_match(pattern, key))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &matching {
            inner.entries.remove(key);
        }
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        matching.len() as u64
    }

    /// Checks whether a live entry exists for the key.
    pub async fn exists(&self, key: &str) -> bool {
        let inner = self.inner.read().await;
        inner
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Increments a window counter, creating it with the window's TTL on
    /// first use. Later increments keep the original expiry so the window
    /// is fixed, not sliding.
    pub async fn incr_window(&self, key: &str, window_seconds: u64) -> Option<u64> {
        let mut inner = self.inner.write().await;
        match inner.entries.get_mut(key) {
            Some(entry) if !entry.is_expired() => {
                let count = entry.payload.parse::<u64>().unwrap_or(0) + 1;
                entry.payload = count.to_string();
                Some(count)
            }
            _ => {
                inner.entries.insert(
                    key.to_string(),
                    MemoryEntry::new("1".to_string(), Some(window_seconds)),
                );
                let count = inner.entries.len();
                inner.stats.set_total_entries(count);
                Some(1)
            }
        }
    }

    /// Removes every entry.
    pub async fn flush_all(&self) -> bool {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.stats.set_total_entries(0);
        true
    }

    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut inner = self.inner.write().await;
        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.entries.remove(key);
        }
        let count = inner.entries.len();
        inner.stats.set_total_entries(count);
        expired.len()
    }

    /// Returns current statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.read().await;
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// Returns true if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

// == Glob Matching ==
/// Matches a key against a pattern where `*` matches any run of characters
/// and everything else matches literally.
fn glob_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let mut pos = 0;
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !key.starts_with(part) {
                return false;
            }
            pos = part.len();
        } else if i == last {
            return key.len() >= pos + part.len() && key[pos..].ends_with(part);
        } else {
            match key[pos..].find(part) {
                Some(idx) => pos += idx + part.len(),
                None => return false,
            }
        }
    }
    true
}
