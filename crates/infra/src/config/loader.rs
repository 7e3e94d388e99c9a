//! Configuration loader
//!
//! Loads a [`ClientConfig`] from environment variables or files. The
//! transport itself never reads the environment; this is a helper for
//! applications that want the conventional variables.
//!
//! ## Environment Variables
//! - `AGORA_APP_ID`: application id (required)
//! - `AGORA_REGION_AREA`: `US`, `EU`, `AP` or `CN` (required)
//! - `AGORA_HTTP_TIMEOUT_SECS`: overall HTTP timeout in seconds (optional)
//! - `AGORA_CUSTOMER_KEY` / `AGORA_CUSTOMER_SECRET`: Basic auth pair
//!   (optional, both or neither)
//!
//! ## File Formats
//! JSON or TOML, detected by extension.

use std::path::Path;

use agora_rest_domain::{BasicAuthConfig, ClientConfig, RegionArea, RestError, Result};

use crate::errors::InfraError;

pub const ENV_APP_ID: &str = "AGORA_APP_ID";
pub const ENV_REGION_AREA: &str = "AGORA_REGION_AREA";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "AGORA_HTTP_TIMEOUT_SECS";
pub const ENV_CUSTOMER_KEY: &str = "AGORA_CUSTOMER_KEY";
pub const ENV_CUSTOMER_SECRET: &str = "AGORA_CUSTOMER_SECRET";

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Format for `path`'s extension; files without one are treated as JSON.
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()).unwrap_or("json") {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(RestError::Config(format!("Unsupported config format: {other}"))),
        }
    }
}

/// Load configuration from the process environment.
///
/// # Errors
/// Returns `RestError::Config` if a required variable is missing or a value
/// is invalid, and `RestError::InvalidArea` for an unknown region area.
pub fn load_from_env() -> Result<ClientConfig> {
    load_from_vars(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup.
pub fn load_from_vars<F>(lookup: F) -> Result<ClientConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let required = |key: &str| {
        lookup(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| {
                RestError::Config(format!("Missing required environment variable: {key}"))
            })
    };

    let app_id = required(ENV_APP_ID)?;
    let region_area: RegionArea = required(ENV_REGION_AREA)?.parse()?;

    let http_timeout_secs = match lookup(ENV_HTTP_TIMEOUT_SECS) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| RestError::Config(format!("Invalid HTTP timeout: {e}")))?,
        None => 0,
    };

    let credential = match (lookup(ENV_CUSTOMER_KEY), lookup(ENV_CUSTOMER_SECRET)) {
        (Some(username), Some(password)) => Some(BasicAuthConfig { username, password }),
        (None, None) => None,
        _ => {
            return Err(RestError::Config(format!(
                "{ENV_CUSTOMER_KEY} and {ENV_CUSTOMER_SECRET} must be set together"
            )))
        }
    };

    let config = ClientConfig { app_id, region_area, http_timeout_secs, credential };
    config.validate()?;
    Ok(config)
}

/// Load configuration from a JSON or TOML file.
///
/// # Errors
/// Returns `RestError::Config` if the file is missing, unreadable, in an
/// unsupported format, or fails to parse or validate.
pub fn load_from_file(path: impl AsRef<Path>) -> Result<ClientConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(RestError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let format = ConfigFormat::from_path(path)?;
    let contents = std::fs::read_to_string(path)
        .map_err(|e| RestError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, format)
}

/// Parse and validate configuration text.
pub fn parse_config(contents: &str, format: ConfigFormat) -> Result<ClientConfig> {
    let config: ClientConfig = match format {
        ConfigFormat::Toml => {
            toml::from_str(contents).map_err(|e| RestError::from(InfraError::from(e)))?
        }
        ConfigFormat::Json => serde_json::from_str(contents)
            .map_err(|e| RestError::Config(format!("Invalid JSON format: {e}")))?,
    };
    config.validate()?;
    Ok(config)
}
