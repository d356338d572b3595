//! Redis Store Backend
//!
//! Async Redis client used as the primary backend. Connection establishment
//! retries with capped backoff up to a configurable ceiling; once connected,
//! the `ConnectionManager` re-establishes dropped connections on its own.
//!
//! Every operation fails open: faults are logged and reported as a miss or
//! a no-op so a Redis outage degrades caching rather than request handling.

use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::store::StoreError;

// == Redis Store ==
/// Handle to the remote store. Cloning shares the underlying connection.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    // == Connect ==
    /// Establishes a connection with bounded retry.
    ///
    /// Backoff grows with the attempt number, capped at 3 seconds. After
    /// `max_retries` failed attempts the error is returned to the caller;
    /// this is the only store operation that surfaces an error.
    pub async fn connect(url: &str, max_retries: u32) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(|source| StoreError::Connection {
            attempts: 0,
            source,
        })?;

        let mut attempt: u32 = 0;
        loop {
            match client.get_connection_manager().await {
                Ok(manager) => {
                    info!(url, "redis connection established");
                    return Ok(Self { manager });
                }
                Err(source) => {
                    attempt += 1;
                    if attempt > max_retries {
                        return Err(StoreError::Connection {
                            attempts: attempt,
                            source,
                        });
                    }
                    let backoff = Duration::from_millis((u64::from(attempt) * 100).min(3000));
                    warn!(attempt, ?backoff, "redis connection failed, retrying");
                    sleep(backoff).await;
                }
            }
        }
    }

    // == Set ==
    /// Writes a serialized payload, with expiry when a TTL is given.
    pub async fn set(&self, key: &str, payload: String, ttl_seconds: Option<u64>) -> bool {
        let mut con = self.manager.clone();
        let result: RedisResult<()> = match ttl_seconds {
            Some(ttl) => con.set_ex(key, payload, ttl).await,
            None => con.set(key, payload).await,
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                error!(key, %err, "redis SET failed");
                false
            }
        }
    }

    // == Get ==
    /// Reads a serialized payload; absent, expired, and errored reads all
    /// come back as `None`.
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut con = self.manager.clone();
        let result: RedisResult<Option<String>> = con.get(key).await;
        match result {
            Ok(payload) => payload,
            Err(err) => {
                error!(key, %err, "redis GET failed");
                None
            }
        }
    }

    // == Delete ==
    /// Removes a key. Reports success whether or not the key existed.
    pub async fn delete(&self, key: &str) -> bool {
        let mut con = self.manager.clone();
        let result: RedisResult<u64> = con.del(key).await;
        match result {
            Ok(_) => true,
            Err(err) => {
                error!(key, %err, "redis DEL failed");
                false
            }
        }
    }

    // == Delete By Pattern ==
    /// Enumerates keys matching a glob pattern and bulk-deletes them.
    ///
    /// Returns the number of keys actually removed, 0 on error.
    pub async fn delete_pattern(&self, pattern: &str) -> u64 {
        let mut con = self.manager.clone();
        let keys: Vec<String> = match con.keys(pattern).await {
            Ok(keys) => keys,
            Err(err) => {
                error!(pattern, %err, "redis KEYS failed");
                return 0;
            }
        };
        if keys.is_empty() {
            return 0;
        }

        let result: RedisResult<u64> = con.del(keys).await;
        match result {
            Ok(removed) => removed,
            Err(err) => {
                error!(pattern, %err, "redis DEL failed");
                0
            }
        }
    }

    // == Exists ==
    /// Checks key presence; false on error.
    pub async fn exists(&self, key: &str) -> bool {
        let mut con = self.manager.clone();
        let result: RedisResult<bool> = con.exists(key).await;
        match result {
            Ok(present) => present,
            Err(err) => {
                error!(key, %err, "redis EXISTS failed");
                false
            }
        }
    }

    // == Window Counter ==
    /// Increments a counter, arming the window expiry on first use.
    ///
    /// Returns the post-increment count, or `None` on error.
    pub async fn incr_window(&self, key: &str, window_seconds: u64) -> Option<u64> {
        let mut con = self.manager.clone();
        let result: RedisResult<u64> = con.incr(key, 1u64).await;
        let count = match result {
            Ok(count) => count,
            Err(err) => {
                error!(key, %err, "redis INCR failed");
                return None;
            }
        };

        if count == 1 {
            let result: RedisResult<bool> = con.expire(key, window_seconds as i64).await;
            if let Err(err) = result {
                error!(key, %err, "redis EXPIRE failed");
            }
        }
        Some(count)
    }

    // == Flush ==
    /// Clears the entire store.
    pub async fn flush_all(&self) -> bool {
        let mut con = self.manager.clone();
        let result: RedisResult<()> = redis::cmd("FLUSHALL").query_async(&mut con).await;
        match result {
            Ok(()) => {
                warn!("redis flushed, all data cleared");
                true
            }
            Err(err) => {
                error!(%err, "redis FLUSHALL failed");
                false
            }
        }
    }

    // == Info ==
    /// Fetches the server's statistics section for the stats endpoint.
    pub async fn info(&self) -> Option<String> {
        let mut con = self.manager.clone();
        let result: RedisResult<String> = redis::cmd("INFO").arg("stats").query_async(&mut con).await;
        match result {
            Ok(info) => Some(info),
            Err(err) => {
                error!(%err, "redis INFO failed");
                None
            }
        }
    }

    // == Ping ==
    /// Liveness probe for health reporting.
    pub async fn ping(&self) -> bool {
        let mut con = self.manager.clone();
        let result: RedisResult<String> = redis::cmd("PING").query_async(&mut con).await;
        result.is_ok()
    }
}
