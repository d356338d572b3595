//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Redis host
    pub redis_host: String,
    /// Redis port
    pub redis_port: u16,
    /// Optional Redis password
    pub redis_password: Option<String>,
    /// Connection attempts before giving up on the Redis backend
    pub redis_max_retries: u32,
    /// Response cache TTL in seconds
    pub response_cache_ttl: u64,
    /// Expiry sweep interval in seconds (memory backend only)
    pub cleanup_interval: u64,
    /// General rate limit window in milliseconds
    pub rate_limit_window_ms: u64,
    /// General rate limit request ceiling per window
    pub rate_limit_max: u64,
    /// Allowed CORS origins; `None` allows any origin
    pub cors_origins: Option<Vec<String>>,
    /// Deployment environment ("development" or "production")
    pub environment: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `REDIS_HOST` - Redis host (default: localhost)
    /// - `REDIS_PORT` - Redis port (default: 6379)
    /// - `REDIS_PASSWORD` - Redis password (default: none)
    /// - `REDIS_MAX_RETRIES` - Connection attempts before fallback (default: 10)
    /// - `CACHE_TTL` - Response cache TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Memory backend sweep frequency in seconds (default: 1)
    /// - `RATE_LIMIT_WINDOW_MS` - General limiter window (default: 900000, i.e. 15 minutes)
    /// - `RATE_LIMIT_MAX_REQUESTS` - General limiter ceiling (default: 100)
    /// - `CORS_ORIGIN` - Comma-separated origin allowlist (default: any origin)
    /// - `APP_ENV` - Deployment environment (default: development)
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            redis_host: env::var("REDIS_HOST").unwrap_or_else(|_| "localhost".to_string()),
            redis_port: env::var("REDIS_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(6379),
            redis_password: env::var("REDIS_PASSWORD").ok().filter(|v| !v.is_empty()),
            redis_max_retries: env::var("REDIS_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            response_cache_ttl: env::var("CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            rate_limit_window_ms: env::var("RATE_LIMIT_WINDOW_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(15 * 60 * 1000),
            rate_limit_max: env::var("RATE_LIMIT_MAX_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            cors_origins: env::var("CORS_ORIGIN").ok().map(|v| {
                v.split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            }),
            environment: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Connection URL for the Redis backend.
    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) => format!(
                "redis://:{}@{}:{}",
                password, self.redis_host, self.redis_port
            ),
            None => format!("redis://{}:{}", self.redis_host, self.redis_port),
        }
    }

    /// True when running with `APP_ENV=production`.
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            redis_password: None,
            redis_max_retries: 10,
            response_cache_ttl: 300,
            cleanup_interval: 1,
            rate_limit_window_ms: 15 * 60 * 1000,
            rate_limit_max: 100,
            cors_origins: None,
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.redis_port, 6379);
        assert_eq!(config.response_cache_ttl, 300);
        assert_eq!(config.rate_limit_max, 100);
        assert_eq!(config.rate_limit_window_ms, 900_000);
        assert!(config.cors_origins.is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn test_redis_url_without_password() {
        let config = Config::default();
        assert_eq!(config.redis_url(), "redis://localhost:6379");
    }

    #[test]
    fn test_redis_url_with_password() {
        let config = Config {
            redis_password: Some("secret".to_string()),
            ..Config::default()
        };
        assert_eq!(config.redis_url(), "redis://:secret@localhost:6379");
    }
}
