//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GELATERIA_API_BASE_URL` - Base URL of the remote catalog API
//!
//! ## Optional
//! - `GELATERIA_CATALOG_TTL_SECS` - Catalog cache time-to-live in seconds
//!   (default: 3600)
//! - `GELATERIA_DATA_DIR` - Directory for persisted cart and catalog state
//!   (default: .gelateria)
//!
//! The TTL trades staleness against request volume: seconds make an
//! operator's price and stock edits show up almost immediately, an hour
//! keeps request volume and perceived latency down. It is a parameter of
//! the cache, never a constant inside it.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_TTL_SECS: &str = "3600";
const DEFAULT_DATA_DIR: &str = ".gelateria";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the remote catalog API
    pub api_base_url: String,
    /// Maximum age of a persisted catalog snapshot before a refresh must
    /// hit the network
    pub catalog_ttl: Duration,
    /// Directory backing the persistent store
    pub data_dir: PathBuf,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("GELATERIA_API_BASE_URL")?;
        validate_base_url(&api_base_url, "GELATERIA_API_BASE_URL")?;

        let ttl_secs = get_env_or_default("GELATERIA_CATALOG_TTL_SECS", DEFAULT_TTL_SECS)
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("GELATERIA_CATALOG_TTL_SECS".to_string(), e.to_string())
            })?;

        let data_dir = PathBuf::from(get_env_or_default("GELATERIA_DATA_DIR", DEFAULT_DATA_DIR));

        Ok(Self {
            api_base_url,
            catalog_ttl: Duration::from_secs(ttl_secs),
            data_dir,
        })
    }

    /// Build a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_base_url` is not a
    /// valid absolute URL.
    pub fn new(
        api_base_url: impl Into<String>,
        catalog_ttl: Duration,
        data_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let api_base_url = api_base_url.into();
        validate_base_url(&api_base_url, "api_base_url")?;
        Ok(Self {
            api_base_url,
            catalog_ttl,
            data_dir: data_dir.into(),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a value parses as an absolute URL.
fn validate_base_url(value: &str, name: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidEnvVar(name.to_string(), e.to_string()))
}
