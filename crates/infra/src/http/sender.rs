//! Outbound HTTP seam
//!
//! [`HttpSender`] executes one fully prepared request. The driver owns
//! retries, region rotation and the call deadline; a sender performs exactly
//! one exchange.

use std::time::Duration;

use agora_rest_domain::constants::DEFAULT_HTTP_TIMEOUT;
use agora_rest_domain::{RestError, Result};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Request, Response};
use tracing::debug;

use crate::errors::InfraError;

/// Executes a single HTTP exchange.
#[async_trait]
pub trait HttpSender: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// [`HttpSender`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: ReqwestClient,
}

impl ReqwestSender {
    /// Build a client whose overall per-request timeout is `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let timeout = if timeout.is_zero() { DEFAULT_HTTP_TIMEOUT } else { timeout };
        let client = ReqwestClient::builder().timeout(timeout).no_proxy().build().map_err(|err| {
            let infra: InfraError = err.into();
            RestError::from(infra)
        })?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: ReqwestClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ReqwestClient {
        &self.client
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    async fn send(&self, request: Request) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "sending HTTP request");

        match self.client.execute(request).await {
            Ok(response) => {
                debug!(%method, %url, status = %response.status(), "received HTTP response");
                Ok(response)
            }
            Err(err) => {
                debug!(%method, %url, error = %err, "HTTP request failed");
                let infra: InfraError = err.into();
                Err(RestError::from(infra))
            }
        }
    }
}
