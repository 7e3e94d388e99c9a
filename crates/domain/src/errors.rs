//! Error types used throughout the transport

use thiserror::Error;

/// Main error type for the REST transport
///
/// Transport-level faults (DNS, network, cancellation) and gateway-level
/// faults (non-2xx with an unrecognised body) live here. Business errors are
/// not a variant: they come back as a non-success response and are decoded
/// by the caller.
#[derive(Error, Debug)]
pub enum RestError {
    /// A locally synthesised fault the caller should treat as a hint.
    #[error("{message}")]
    Internal { message: String },

    /// Wrapper inspected by the retry kernel. `need_retry == false` vetoes
    /// any further attempt.
    #[error("{inner}")]
    Retry {
        #[source]
        inner: Box<RestError>,
        need_retry: bool,
    },

    /// Non-2xx response whose body is not a structured error envelope.
    #[error("statusCode:{http_status},body:{body}")]
    Gateway { http_status: u16, body: String },

    #[error("invalid domain area")]
    InvalidArea(String),

    #[error("query all dns is failed")]
    DnsExhausted,

    #[error("context canceled")]
    Cancelled,

    #[error("context deadline exceeded")]
    DeadlineExceeded,

    #[error("network error: {0}")]
    Network(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl RestError {
    /// Create an [`RestError::Internal`] from any message.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Wrap `inner` so the retry kernel keeps going.
    pub fn retryable(inner: RestError) -> Self {
        Self::Retry { inner: Box::new(inner), need_retry: true }
    }

    /// Wrap `inner` so the retry kernel stops immediately.
    pub fn permanent(inner: RestError) -> Self {
        Self::Retry { inner: Box::new(inner), need_retry: false }
    }

    /// Build a gateway error from a raw status and body.
    pub fn gateway(http_status: u16, body: &[u8]) -> Self {
        Self::Gateway { http_status, body: String::from_utf8_lossy(body).into_owned() }
    }

    /// True when this error is, or wraps, a `Retry` with `need_retry == false`.
    pub fn vetoes_retry(&self) -> bool {
        match self {
            Self::Retry { need_retry: false, .. } => true,
            Self::Retry { inner, .. } => inner.vetoes_retry(),
            _ => false,
        }
    }

    /// Strip one `Retry` wrapper, returning the wrapped error. Other variants
    /// are returned as-is.
    pub fn unwrap_retry(self) -> RestError {
        match self {
            Self::Retry { inner, .. } => *inner,
            other => other,
        }
    }

    /// Whether the failure came from the context (cancel or deadline).
    pub fn is_context_error(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, RestError>;
