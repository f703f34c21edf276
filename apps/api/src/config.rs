//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::path::PathBuf;

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP server port
    pub http_port: u16,

    /// Path to the SQLite database file
    pub database_path: PathBuf,

    /// Maximum pool size
    pub db_max_connections: u32,

    /// Origins allowed by CORS; `*` allows any
    pub cors_origins: Vec<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// ## Variables
    /// - `TERMIN_HTTP_PORT` (default: 8000)
    /// - `TERMIN_DATABASE_PATH` (default: ./data/termine.db)
    /// - `TERMIN_DB_MAX_CONNECTIONS` (default: 5)
    /// - `TERMIN_CORS_ORIGINS` - comma separated (default: the Vite dev server)
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = ApiConfig {
            http_port: lookup("TERMIN_HTTP_PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TERMIN_HTTP_PORT".to_string()))?,

            database_path: lookup("TERMIN_DATABASE_PATH")
                .unwrap_or_else(|| "./data/termine.db".to_string())
                .into(),

            db_max_connections: lookup("TERMIN_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TERMIN_DB_MAX_CONNECTIONS".to_string()))?,

            cors_origins: lookup("TERMIN_CORS_ORIGINS")
                .unwrap_or_else(|| "http://localhost:5173,http://127.0.0.1:5173".to_string())
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "TERMIN_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
