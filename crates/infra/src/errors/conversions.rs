//! Conversions from external infrastructure errors into transport errors.

use agora_rest_domain::RestError;
use reqwest::header::InvalidHeaderValue;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the transport error.
#[derive(Debug)]
pub struct InfraError(pub RestError);

impl From<InfraError> for RestError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RestError> for InfraError {
    fn from(value: RestError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoRestError {
    fn into_rest(self) -> RestError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → RestError */
/* -------------------------------------------------------------------------- */

impl IntoRestError for HttpError {
    fn into_rest(self) -> RestError {
        if self.is_timeout() {
            return RestError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return RestError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_builder() {
            return RestError::internal(format!("invalid HTTP request: {self}"));
        }

        if self.is_decode() || self.is_body() {
            return RestError::Network(format!("failed to read HTTP body: {self}"));
        }

        if let Some(status) = self.status() {
            return RestError::Network(format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        RestError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_rest())
    }
}

/* -------------------------------------------------------------------------- */
/* header / config parse errors → RestError */
/* -------------------------------------------------------------------------- */

impl IntoRestError for InvalidHeaderValue {
    fn into_rest(self) -> RestError {
        RestError::internal(format!("invalid header value: {self}"))
    }
}

impl From<InvalidHeaderValue> for InfraError {
    fn from(value: InvalidHeaderValue) -> Self {
        InfraError(value.into_rest())
    }
}

impl IntoRestError for toml::de::Error {
    fn into_rest(self) -> RestError {
        RestError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(value.into_rest())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
