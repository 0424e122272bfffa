//! API server configuration.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. `main` loads a `.env` file first when one exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind (APOTHECA_BIND_ADDR)
    pub bind_addr: String,

    /// HTTP port (APOTHECA_PORT)
    pub port: u16,

    /// SQLite database file (APOTHECA_DB_PATH)
    pub db_path: String,

    /// Pool size (APOTHECA_DB_MAX_CONNECTIONS)
    pub db_max_connections: u32,

    /// Emit JSON log lines instead of human-readable text (APOTHECA_LOG_JSON)
    pub log_json: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            db_path: "./apotheca.db".to_string(),
            db_max_connections: 5,
            log_json: false,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            bind_addr: env::var("APOTHECA_BIND_ADDR").unwrap_or(defaults.bind_addr),
            port: parse_var("APOTHECA_PORT", defaults.port)?,
            db_path: env::var("APOTHECA_DB_PATH").unwrap_or(defaults.db_path),
            db_max_connections: parse_var("APOTHECA_DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            log_json: parse_var("APOTHECA_LOG_JSON", defaults.log_json)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("APOTHECA_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name.to_string())),
        Err(_) => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
