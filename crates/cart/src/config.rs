//! Cart subsystem configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FERNWAY_API_BASE_URL` - Base URL of the storefront REST API
//!
//! ## Optional
//! - `FERNWAY_API_TOKEN` - Bearer token sent to the reconciliation endpoint
//! - `FERNWAY_CART_STORAGE_DIR` - Directory for the durable cart snapshot
//!   (default: `.fernway`)

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_STORAGE_DIR: &str = ".fernway";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart subsystem configuration.
///
/// `SecretString` redacts the token from `Debug` output.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// Base URL of the storefront REST API.
    pub api_base_url: String,
    /// Bearer token for the reconciliation endpoint, if required.
    pub api_token: Option<SecretString>,
    /// Directory the durable snapshot is written under.
    pub storage_dir: PathBuf,
}

impl CartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or the base
    /// URL does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("FERNWAY_API_BASE_URL")?;
        Url::parse(&api_base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("FERNWAY_API_BASE_URL".to_string(), e.to_string())
        })?;

        let api_token = get_optional_env("FERNWAY_API_TOKEN").map(SecretString::from);
        let storage_dir =
            PathBuf::from(get_env_or_default("FERNWAY_CART_STORAGE_DIR", DEFAULT_STORAGE_DIR));

        Ok(Self {
            api_base_url,
            api_token,
            storage_dir,
        })
    }

    /// URL of the cart reconciliation endpoint.
    #[must_use]
    pub fn validate_endpoint(&self) -> String {
        format!("{}/cart/validate", self.api_base_url.trim_end_matches('/'))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
