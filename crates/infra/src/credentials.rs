//! Request credentials
//!
//! A [`Credential`] decorates each outgoing request (typically with an
//! `Authorization` header). The driver applies it once per attempt, after
//! the body has been attached.

use std::fmt;

use agora_rest_domain::{BasicAuthConfig, RestError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderValue, AUTHORIZATION};

/// Decorates outgoing requests with authentication material.
pub trait Credential: Send + Sync + fmt::Debug {
    /// Short, stable name of the scheme (for logs).
    fn name(&self) -> &'static str;

    /// Attach credentials to `request`.
    fn decorate(&self, request: &mut reqwest::Request) -> Result<()>;
}

/// HTTP Basic authentication with a customer key/secret pair.
#[derive(Clone)]
pub struct BasicAuthCredential {
    username: String,
    password: String,
}

impl BasicAuthCredential {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// `Basic base64(username:password)`
    pub fn header_value(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

impl Credential for BasicAuthCredential {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn decorate(&self, request: &mut reqwest::Request) -> Result<()> {
        let mut value = HeaderValue::from_str(&self.header_value()).map_err(|err| {
            RestError::internal(format!("invalid basic auth header: {err}"))
        })?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);
        Ok(())
    }
}

impl From<&BasicAuthConfig> for BasicAuthCredential {
    fn from(config: &BasicAuthConfig) -> Self {
        Self::new(config.username.clone(), config.password.clone())
    }
}

impl fmt::Debug for BasicAuthCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthCredential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::{Method, Url};

    use super::*;

    fn request() -> reqwest::Request {
        reqwest::Request::new(Method::GET, Url::parse("https://api-us-west-1.agora.io/x").unwrap())
    }

    #[test]
    fn basic_header_is_base64_of_user_colon_password() {
        let credential = BasicAuthCredential::new("key", "secret");
        // base64("key:secret")
        assert_eq!(credential.header_value(), "Basic a2V5OnNlY3JldA==");
    }

    #[test]
    fn decorate_sets_sensitive_authorization_header() {
        let credential = BasicAuthCredential::new("key", "secret");
        let mut request = request();

        credential.decorate(&mut request).unwrap();

        let header = request.headers().get(AUTHORIZATION).unwrap();
        assert_eq!(header.to_str().unwrap(), "Basic a2V5OnNlY3JldA==");
        assert!(header.is_sensitive());
    }

    #[test]
    fn decorate_replaces_existing_authorization() {
        let mut request = request();
        request.headers_mut().insert(AUTHORIZATION, HeaderValue::from_static("Bearer old"));

        BasicAuthCredential::new("a", "b").decorate(&mut request).unwrap();

        assert_eq!(request.headers().get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn debug_output_redacts_password() {
        let credential = BasicAuthCredential::from(&BasicAuthConfig {
            username: "customer".into(),
            password: "hunter2".into(),
        });
        let rendered = format!("{credential:?}");
        assert!(rendered.contains("customer"));
        assert!(!rendered.contains("hunter2"));
        assert_eq!(credential.name(), "basic");
    }
}
