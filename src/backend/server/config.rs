/**
 * Server Configuration
 *
 * This module loads and validates the server configuration.
 *
 * # Configuration Sources
 *
 * In increasing precedence:
 *
 * 1. Built-in defaults (good enough for local development)
 * 2. A TOML file, if `CODECOLLAB_CONFIG` names one
 * 3. Environment variables (`.env` is loaded first by the binary)
 *
 * # Example File
 *
 * ```toml
 * bind_addr = "0.0.0.0:3000"
 * database_url = "postgres://localhost/codecollab"
 * jwt_secret = "change-me"
 * token_ttl_days = 7
 * ```
 */

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Environment variable naming the optional TOML config file
pub const CONFIG_PATH_ENV: &str = "CODECOLLAB_CONFIG";

/// Secret used when none is configured; the binary warns about it
pub const DEV_JWT_SECRET: &str = "codecollab-dev-secret";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// PostgreSQL URL; `None` selects the in-memory store
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub token_ttl_days: u32,
    /// Allowed browser origin for CORS
    pub cors_origin: String,
    /// Per-room broadcast channel capacity
    pub broadcast_capacity: usize,
    /// Capacity given to rooms created over HTTP
    pub default_max_participants: u32,
    /// Gemini API key; `None` disables the AI endpoints
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_days: 30,
            cors_origin: "http://localhost:5173".to_string(),
            broadcast_capacity: 256,
            default_max_participants: 10,
            gemini_api_key: None,
            gemini_model: "gemini-2.0-flash".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load from defaults, the optional config file, then the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(Path::new(path.trim()))?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; absent keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply environment-style overrides through `lookup`
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = get("DATABASE_URL") {
            self.database_url = Some(v);
        }
        if let Some(v) = get("JWT_SECRET") {
            self.jwt_secret = v;
        }
        if let Some(v) = get("TOKEN_TTL_DAYS") {
            self.token_ttl_days = parse("TOKEN_TTL_DAYS", v)?;
        }
        if let Some(v) = get("CORS_ORIGIN") {
            self.cors_origin = v;
        }
        if let Some(v) = get("BROADCAST_CAPACITY") {
            self.broadcast_capacity = parse("BROADCAST_CAPACITY", v)?;
        }
        if let Some(v) = get("DEFAULT_MAX_PARTICIPANTS") {
            self.default_max_participants = parse("DEFAULT_MAX_PARTICIPANTS", v)?;
        }
        if let Some(v) = get("GEMINI_API_KEY") {
            self.gemini_api_key = Some(v);
        }
        if let Some(v) = get("GEMINI_MODEL") {
            self.gemini_model = v;
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("jwt_secret must not be empty".to_string()));
        }
        if self.token_ttl_days == 0 {
            return Err(ConfigError::Invalid("token_ttl_days must be at least 1".to_string()));
        }
        if self.broadcast_capacity == 0 {
            return Err(ConfigError::Invalid("broadcast_capacity must be at least 1".to_string()));
        }
        if self.default_max_participants == 0 {
            return Err(ConfigError::Invalid("default_max_participants must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn parse<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue { key, value })
}
