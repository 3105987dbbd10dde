//! Configuration Module
//!
//! This module defines all configuration structures for the export monitor.
//! Configuration is loaded from TOML files and parsed using serde.

use serde::Deserialize;
use std::fs;

/// Main configuration structure
///
/// Contains all configuration sections for the export monitor.
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [api]
/// host = "127.0.0.1"
/// port = 8080
///
/// [database]
/// url = "sqlite://export-tasks.db?mode=rwc"
///
/// [query]
/// # Optional; unset returns every matching batch
/// default_limit = 1000
///
/// [logging]
/// level = "info"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
///
/// # Fields
/// - `host`: IP address to bind to (e.g., "127.0.0.1" or "0.0.0.0")
/// - `port`: TCP port to listen on (e.g., 8080)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Task store configuration
///
/// # Fields
/// - `url`: sqlx SQLite connection URL (e.g., "sqlite://export-tasks.db")
/// - `max_connections`: Upper bound of the connection pool
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Batch query configuration
///
/// `default_limit` caps the number of batches returned when a request does
/// not pass `limit`. Leaving it unset returns every matching batch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    pub default_limit: Option<usize>,
}

/// Logging configuration
///
/// `level` is an `EnvFilter` directive used when `RUST_LOG` is not set.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read, the TOML is invalid or a value is out of range
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;

        if config.query.default_limit == Some(0) {
            anyhow::bail!("query.default_limit must be positive");
        }
        if config.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be positive");
        }

        Ok(config)
    }
}
