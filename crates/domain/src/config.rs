//! Client configuration structures

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_HTTP_TIMEOUT;
use crate::errors::{RestError, Result};
use crate::region::RegionArea;

/// Configuration for a REST client bound to one region area
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Application identifier, bound into URL prefixes by service clients.
    pub app_id: String,
    pub region_area: RegionArea,
    /// Overall HTTP client timeout in seconds; `0` selects the default.
    #[serde(default)]
    pub http_timeout_secs: u64,
    #[serde(default)]
    pub credential: Option<BasicAuthConfig>,
}

/// Username/password pair for HTTP Basic authentication
#[derive(Clone, Serialize, Deserialize)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl ClientConfig {
    pub fn new(app_id: impl Into<String>, region_area: RegionArea) -> Self {
        Self { app_id: app_id.into(), region_area, http_timeout_secs: 0, credential: None }
    }

    /// Effective HTTP client timeout (default 10s when unset).
    pub fn http_timeout(&self) -> Duration {
        if self.http_timeout_secs == 0 {
            DEFAULT_HTTP_TIMEOUT
        } else {
            Duration::from_secs(self.http_timeout_secs)
        }
    }

    /// Check the fields the transport cannot default.
    pub fn validate(&self) -> Result<()> {
        if self.app_id.trim().is_empty() {
            return Err(RestError::Config("app_id must not be empty".into()));
        }
        if let Some(credential) = &self.credential {
            if credential.username.is_empty() {
                return Err(RestError::Config("credential username must not be empty".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_timeout_means_default() {
        let config = ClientConfig::new("app", RegionArea::US);
        assert_eq!(config.http_timeout(), Duration::from_secs(10));

        let config = ClientConfig { http_timeout_secs: 3, ..config };
        assert_eq!(config.http_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn validate_rejects_empty_app_id() {
        let config = ClientConfig::new("  ", RegionArea::CN);
        assert!(matches!(config.validate(), Err(RestError::Config(_))));
        assert!(ClientConfig::new("app", RegionArea::CN).validate().is_ok());
    }

    #[test]
    fn deserializes_minimal_document() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"app_id":"abc","region_area":"eu"}"#).unwrap();
        assert_eq!(config.region_area, RegionArea::EU);
        assert_eq!(config.http_timeout_secs, 0);
        assert!(config.credential.is_none());
    }

    #[test]
    fn unknown_area_fails_to_deserialize() {
        let err = serde_json::from_str::<ClientConfig>(r#"{"app_id":"abc","region_area":"SA"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("invalid domain area"));
    }

    #[test]
    fn debug_redacts_password() {
        let auth = BasicAuthConfig { username: "key".into(), password: "secret".into() };
        let rendered = format!("{auth:?}");
        assert!(rendered.contains("key"));
        assert!(!rendered.contains("secret"));
    }
}
