//! Server configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults suitable for local development.

use std::env;

use thiserror::Error;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port
    pub port: u16,

    /// Bind address
    pub host: String,

    /// SQLite database file path
    pub database_path: String,

    /// Maximum database connections in the pool
    pub db_max_connections: u32,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ServerConfig {
            port: env::var("VENDRA_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VENDRA_PORT".to_string()))?,

            host: env::var("VENDRA_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),

            database_path: env::var("VENDRA_DATABASE_PATH")
                .unwrap_or_else(|_| "vendra.db".to_string()),

            db_max_connections: env::var("VENDRA_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("VENDRA_DB_MAX_CONNECTIONS".to_string()))?,
        };

        Ok(config)
    }

    /// The socket address string to bind to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        // Scoped to variables this test does not set
        let config = ServerConfig {
            port: 8080,
            host: "0.0.0.0".to_string(),
            database_path: "vendra.db".to_string(),
            db_max_connections: 5,
        };
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }
}
