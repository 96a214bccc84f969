//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use seo_booster_core::DEFAULT_FREE_TIER_LIMIT;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub storage_dir: PathBuf,
    pub storage_key: String,
    pub free_tier_limit: u32,
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub generation_model: String,
    pub generation_timeout: Duration,
    pub allowed_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        // --- Load Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "127.0.0.1:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:5173");

        // --- Load Storage and Quota Settings ---
        let storage_dir = PathBuf::from(var_or("STORAGE_DIR", "./data"));

        let storage_key = var_or("STORAGE_KEY", "seoBoosterUser");
        if storage_key.is_empty()
            || !storage_key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::InvalidValue(
                "STORAGE_KEY".to_string(),
                format!("'{}' must be a non-empty alphanumeric name", storage_key),
            ));
        }

        let free_tier_limit = match lookup("FREE_TIER_LIMIT") {
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("FREE_TIER_LIMIT".to_string(), e.to_string())
            })?,
            None => DEFAULT_FREE_TIER_LIMIT,
        };

        // --- Load Generator Settings ---
        let gemini_api_key = lookup("GEMINI_API_KEY").filter(|key| !key.trim().is_empty());
        let gemini_api_base = var_or(
            "GEMINI_API_BASE",
            "https://generativelanguage.googleapis.com/v1beta/openai",
        );
        let generation_model = var_or("GENERATION_MODEL", "gemini-2.5-flash");

        let timeout_secs = var_or("GENERATION_TIMEOUT_SECS", "60")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidValue("GENERATION_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "GENERATION_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            bind_address,
            log_level,
            storage_dir,
            storage_key,
            free_tier_limit,
            gemini_api_key,
            gemini_api_base,
            generation_model,
            generation_timeout: Duration::from_secs(timeout_secs),
            allowed_origin,
        })
    }
}
