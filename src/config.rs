//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Exact origin allowed for CORS; permissive when unset (local development)
    #[serde(default)]
    pub cors_allowed_origin: Option<String>,
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Authentication configuration (JWT issuance and validation)
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC signing key for bearer tokens (32+ bytes)
    pub jwt_secret: String,
    /// Token issuer claim
    pub issuer: String,
    /// Token audience claim
    pub audience: String,
    /// Token validity window in days (default: 7)
    pub token_ttl_days: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (PEERLENS_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "data/peerlens.db")?
            .set_default("auth.issuer", "PeerLens")?
            .set_default("auth.audience", "PeerLensClient")?
            .set_default("auth.token_ttl_days", 7)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (PEERLENS_*)
            .add_source(
                Environment::with_prefix("PEERLENS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_JWT_SECRET_BYTES: usize = 32;

        if self.auth.jwt_secret.as_bytes().len() < MIN_JWT_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.jwt_secret must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            )));
        }

        if self.auth.token_ttl_days <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.token_ttl_days must be greater than 0".to_string(),
            ));
        }

        if self.auth.issuer.trim().is_empty() || self.auth.audience.trim().is_empty() {
            return Err(crate::error::AppError::Config(
                "auth.issuer and auth.audience must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
