//! Response envelope and typed decoding
//!
//! [`BaseResponse`] is what the driver returns for every completed exchange,
//! whatever the status. [`decode_response`] turns it into a typed
//! [`ServiceResponse`], separating business errors (structured error body)
//! from gateway errors (anything else).

use agora_rest_domain::constants::REQUEST_ID_HEADER;
use agora_rest_domain::{RestError, Result};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Raw outcome of one completed HTTP exchange.
#[derive(Debug, Clone, Default)]
pub struct BaseResponse {
    pub http_status_code: u16,
    pub raw_body: Vec<u8>,
    /// Response headers; `None` for synthesised responses.
    pub headers: Option<HeaderMap>,
}

impl BaseResponse {
    pub fn new(http_status_code: u16, raw_body: Vec<u8>, headers: Option<HeaderMap>) -> Self {
        Self { http_status_code, raw_body, headers }
    }

    /// JSON-decode the raw body into `T`.
    pub fn unmarshal_to_target<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.raw_body)?)
    }

    /// `X-Request-Id` response header, when present and valid text.
    pub fn request_id(&self) -> Option<&str> {
        self.headers.as_ref()?.get(REQUEST_ID_HEADER)?.to_str().ok()
    }

    pub fn is_success(&self) -> bool {
        self.http_status_code == 200
    }

    /// Body as text, lossily decoded.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.raw_body).into_owned()
    }
}

/// Structured error body returned by the services on non-success status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Typed response: the raw envelope plus either the decoded success body or
/// the decoded business error.
#[derive(Debug, Clone)]
pub struct ServiceResponse<T> {
    pub base: BaseResponse,
    pub success: Option<T>,
    pub error: Option<ErrorBody>,
}

impl<T> ServiceResponse<T> {
    pub fn is_success(&self) -> bool {
        self.base.is_success()
    }

    pub fn request_id(&self) -> Option<&str> {
        self.base.request_id()
    }

    pub fn into_success(self) -> Option<T> {
        self.success
    }
}

/// Decode a completed exchange into a typed response.
///
/// - status 200: the body must decode as `T`
/// - any other status with a body carrying a numeric `code`: business error
/// - otherwise: [`RestError::Gateway`] with the status and raw body
pub fn decode_response<T: DeserializeOwned>(base: BaseResponse) -> Result<ServiceResponse<T>> {
    if base.is_success() {
        let success = base.unmarshal_to_target::<T>()?;
        return Ok(ServiceResponse { base, success: Some(success), error: None });
    }

    match base.unmarshal_to_target::<ErrorBody>() {
        Ok(error) if error.code.is_some() => {
            Ok(ServiceResponse { base, success: None, error: Some(error) })
        }
        _ => Err(RestError::gateway(base.http_status_code, &base.raw_body)),
    }
}
