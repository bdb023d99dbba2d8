//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `POMELO_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `POMELO_HOST` - Bind address (default: 127.0.0.1)
//! - `POMELO_PORT` - Listen port (default: 8000)
//! - `POMELO_TOKEN_EXPIRE_SECONDS` - Access token lifetime (default: 1800)
//! - `POMELO_PRODUCT_CACHE_TTL_SECONDS` - Product cache TTL (default: 300)
//! - `POMELO_PRODUCT_CACHE_CAPACITY` - Product cache max entries (default: 10000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Pomelo server configuration.
///
/// Constructed once at startup and passed explicitly to the state and store
/// constructors; there is no process-wide configuration singleton.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Lifetime of issued access tokens
    pub token_ttl: Duration,
    /// Time-to-live for cached product reads
    pub product_cache_ttl: Duration,
    /// Maximum number of cached products
    pub product_cache_capacity: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("POMELO_DATABASE_URL")?;
        let host = get_env_or_default("POMELO_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("POMELO_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("POMELO_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("POMELO_PORT".to_string(), e.to_string()))?;
        let token_ttl = get_duration_secs("POMELO_TOKEN_EXPIRE_SECONDS", 1800)?;
        let product_cache_ttl = get_duration_secs("POMELO_PRODUCT_CACHE_TTL_SECONDS", 300)?;
        let product_cache_capacity = get_env_or_default("POMELO_PRODUCT_CACHE_CAPACITY", "10000")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("POMELO_PRODUCT_CACHE_CAPACITY".to_string(), e.to_string())
            })?;

        Ok(Self {
            database_url,
            host,
            port,
            token_ttl,
            product_cache_ttl,
            product_cache_capacity,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a whole-seconds duration from the environment.
fn get_duration_secs(key: &str, default: u64) -> Result<Duration, ConfigError> {
    let secs = get_env_or_default(key, &default.to_string())
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            token_ttl: Duration::from_secs(1800),
            product_cache_ttl: Duration::from_secs(300),
            product_cache_capacity: 10_000,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_get_env_or_default_uses_default() {
        assert_eq!(
            get_env_or_default("POMELO_TEST_UNSET_VAR", "fallback"),
            "fallback"
        );
    }

    #[test]
    fn test_get_duration_secs_default() {
        let d = get_duration_secs("POMELO_TEST_UNSET_DURATION", 42).unwrap();
        assert_eq!(d, Duration::from_secs(42));
    }
}
