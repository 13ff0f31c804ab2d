//! # API Configuration Module
//!
//! This module handles loading and managing configuration for the ScoutPlan API server.
//! It retrieves configuration values from environment variables and provides defaults
//! where appropriate.
//!
//! ## Environment Variables
//!
//! - `API_HOST`: The host address to bind the server to (default: "0.0.0.0")
//! - `API_PORT`: The port to listen on (default: 3000)
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DATABASE_MAX_CONNECTIONS`: Connection pool size (default: 5)
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `API_CORS_ORIGINS`: Comma-separated list of allowed CORS origins
//! - `API_REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
//! - `SESSION_TTL_HOURS`: Lifetime of login sessions (default: 168)
//! - `CACHE_MAX_CAPACITY`: Entries kept by the query cache (default: 1000)
//! - `CACHE_TTL_SECONDS`: Time-to-live of cached responses (default: 300)

use eyre::{Result, eyre};
use std::env;
use std::str::FromStr;
use tracing::Level;

/// Configuration for the ScoutPlan API server
///
/// # Example
///
/// ```no_run
/// use eyre::Result;
/// use scoutplan_api::config::ApiConfig;
///
/// fn example() -> Result<()> {
///     let config = ApiConfig::from_env()?;
///     println!("Starting server on {}:{}", config.host, config.port);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host address for the API server (e.g., "127.0.0.1", "0.0.0.0")
    pub host: String,

    /// Port for the API server to listen on
    pub port: u16,

    /// PostgreSQL database connection string
    pub database_url: String,

    /// Maximum number of pooled database connections
    pub database_max_connections: u32,

    /// Log level for the application
    pub log_level: Level,

    /// CORS allowed origins (optional)
    pub cors_origins: Option<Vec<String>>,

    /// Request timeout in seconds
    pub request_timeout: u64,

    /// How long a login session stays valid, in hours
    pub session_ttl_hours: i64,

    /// Maximum number of cached responses
    pub cache_max_capacity: u64,

    /// Time-to-live of cached responses, in seconds
    pub cache_ttl_seconds: u64,
}

fn parse_or<T: FromStr>(value: Option<String>, default: T, name: &str) -> Result<T> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| eyre!("Invalid {} value: '{}'", name, raw)),
        None => Ok(default),
    }
}

impl ApiConfig {
    /// Creates a new ApiConfig from environment variables
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// - The DATABASE_URL environment variable is not set
    /// - A numeric setting such as API_PORT cannot be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Network settings
        let host = lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(lookup("API_PORT"), 3000, "API_PORT")?;

        // Database settings
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| eyre!("DATABASE_URL environment variable must be set"))?;
        let database_max_connections = parse_or(
            lookup("DATABASE_MAX_CONNECTIONS"),
            5,
            "DATABASE_MAX_CONNECTIONS",
        )?;

        // Logging settings
        let log_level = match lookup("LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        // CORS settings
        let cors_origins = lookup("API_CORS_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        // Performance settings
        let request_timeout = parse_or(
            lookup("API_REQUEST_TIMEOUT_SECONDS"),
            30,
            "API_REQUEST_TIMEOUT_SECONDS",
        )?;

        // Session and cache settings
        let session_ttl_hours = parse_or(lookup("SESSION_TTL_HOURS"), 168, "SESSION_TTL_HOURS")?;
        let cache_max_capacity =
            parse_or(lookup("CACHE_MAX_CAPACITY"), 1000, "CACHE_MAX_CAPACITY")?;
        let cache_ttl_seconds = parse_or(lookup("CACHE_TTL_SECONDS"), 300, "CACHE_TTL_SECONDS")?;

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            log_level,
            cors_origins,
            request_timeout,
            session_ttl_hours,
            cache_max_capacity,
            cache_ttl_seconds,
        })
    }

    /// Returns the server address as a string (e.g., "127.0.0.1:8080")
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
