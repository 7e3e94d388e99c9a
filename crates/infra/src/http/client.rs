use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use agora_rest_common::resilience::delay_after_first;
use agora_rest_common::{default_logger, Context, Level, Logger, RetryError, RetryPolicy};
use agora_rest_domain::constants::{
    CALL_DEADLINE, CONTENT_TYPE_JSON, DEFAULT_HTTP_TIMEOUT, REGION_RETRY_DELAY,
    USER_AGENT_PRODUCT,
};
use agora_rest_domain::{ClientConfig, RegionArea, RestError, Result};
use reqwest::header::{HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Request, Response, Url};
use serde::Serialize;
use tracing::instrument;

use super::response::BaseResponse;
use super::sender::{HttpSender, ReqwestSender};
use crate::credentials::{BasicAuthCredential, Credential};
use crate::dns::HostResolver;
use crate::domain_pool::DomainPool;
use crate::errors::InfraError;

const MODULE: &str = "http";

/// `User-Agent` sent with every request.
///
/// The two spaces after the product token are part of the format.
pub fn user_agent() -> String {
    format!(
        "{USER_AGENT_PRODUCT}  Language/Rust LanguageVersion/{} Arch/{} OS/{} SDKVersion/{}",
        env!("AGORA_RUSTC_VERSION"),
        std::env::consts::ARCH,
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
    )
}

/// Regional REST transport: one shared HTTP sender, one domain pool.
///
/// Every call runs under its own 10s deadline, picks the best domain, and
/// rotates through the area's regional prefixes on network failure until it
/// gets an HTTP response or the deadline passes. Any HTTP response, whatever
/// its status, is returned to the caller as a [`BaseResponse`].
pub struct RestClient {
    app_id: String,
    pool: DomainPool,
    sender: Arc<dyn HttpSender>,
    credential: Option<Arc<dyn Credential>>,
    logger: Arc<dyn Logger>,
    user_agent: HeaderValue,
}

impl RestClient {
    /// Start building a new client.
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::default()
    }

    /// Build a client from a loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        RestClientBuilder::from_config(config).build()
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn area(&self) -> RegionArea {
        self.pool.area()
    }

    pub fn domain_pool(&self) -> &DomainPool {
        &self.pool
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Send `method path` with an optional JSON body.
    ///
    /// `body` is serialised once; a value serialising to JSON `null` (`&()`,
    /// `&None::<T>`) sends no body at all.
    ///
    /// # Errors
    /// - domain selection failure (`DnsExhausted` or a context error)
    /// - the context error when the call is cancelled or times out before
    ///   any attempt ran
    /// - the last attempt's error when the deadline cut the retry loop short
    /// - `Serialization` when `body` cannot be encoded
    #[instrument(skip(self, ctx, body), fields(area = %self.pool.area()))]
    pub async fn do_rest<B>(
        &self,
        ctx: &Context,
        path: &str,
        method: Method,
        body: &B,
    ) -> Result<BaseResponse>
    where
        B: Serialize + ?Sized,
    {
        let ctx = ctx.with_timeout(CALL_DEADLINE);

        self.pool.select_best_domain(&ctx).await?;

        let payload = encode_body(body)?;

        let result = RetryPolicy::<RestError>::new(|| ctx.is_done())
            .delay(delay_after_first(REGION_RETRY_DELAY))
            .on_failed_attempt(|err: &RestError| {
                self.logger.warnf(
                    &ctx,
                    MODULE,
                    format_args!(
                        "request via {} failed: {err}",
                        self.pool.current_region_prefix()
                    ),
                );
                self.pool.next_region();
            })
            .run(|_| self.attempt(&ctx, &method, path, payload.as_deref()))
            .await;

        let response = match result {
            Ok(response) => response,
            Err(RetryError::NotAttempted) => {
                return Err(ctx.err().unwrap_or(RestError::DeadlineExceeded));
            }
            Err(RetryError::Vetoed(err)) => return Err(err.unwrap_retry()),
            Err(RetryError::Stopped { attempts, last }) => {
                self.logger.errorf(
                    &ctx,
                    MODULE,
                    format_args!("giving up on {method} {path} after {attempts} attempts: {last}"),
                );
                return Err(last);
            }
        };

        self.read_response(&ctx, response).await
    }

    async fn attempt(
        &self,
        ctx: &Context,
        method: &Method,
        path: &str,
        payload: Option<&[u8]>,
    ) -> Result<Response> {
        if let Some(bytes) = payload {
            if self.logger.enabled(Level::Debug) {
                self.logger.debugf(
                    ctx,
                    MODULE,
                    format_args!("request body: {}", String::from_utf8_lossy(bytes)),
                );
            }
        }

        let request = self.prepare_request(method, path, payload)?;
        ctx.run(self.sender.send(request)).await?
    }

    /// Build one attempt's request against the pool's current URL.
    ///
    /// Local faults are wrapped so they veto retry: another region cannot
    /// fix a malformed request. No per-request timeout is set; the sender's
    /// client timeout bounds each attempt and `ctx.run` bounds the call.
    fn prepare_request(
        &self,
        method: &Method,
        path: &str,
        payload: Option<&[u8]>,
    ) -> Result<Request> {
        let raw_url = format!("{}{path}", self.pool.current_url());
        let url = Url::parse(&raw_url).map_err(|err| {
            let message = format!("invalid request url {raw_url}: {err}");
            RestError::permanent(RestError::internal(message))
        })?;

        let mut request = Request::new(method.clone(), url);
        if let Some(bytes) = payload {
            *request.body_mut() = Some(bytes.to_vec().into());
        }

        if let Some(credential) = &self.credential {
            credential.decorate(&mut request).map_err(RestError::permanent)?;
        }

        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
        headers.insert(USER_AGENT, self.user_agent.clone());

        Ok(request)
    }

    async fn read_response(&self, ctx: &Context, response: Response) -> Result<BaseResponse> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        let body = ctx.run(response.bytes()).await?.map_err(|err| {
            let infra: InfraError = err.into();
            RestError::from(infra)
        })?;

        if self.logger.enabled(Level::Debug) {
            self.logger.debugf(
                ctx,
                MODULE,
                format_args!("response {status}: {}", String::from_utf8_lossy(&body)),
            );
        }

        Ok(BaseResponse::new(status, body.to_vec(), Some(headers)))
    }
}

impl fmt::Debug for RestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClient")
            .field("app_id", &self.app_id)
            .field("pool", &self.pool)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}

/// JSON-encode `body`; `null` means no body.
fn encode_body<B: Serialize + ?Sized>(body: &B) -> Result<Option<Vec<u8>>> {
    let bytes = serde_json::to_vec(body)?;
    if bytes == b"null" {
        Ok(None)
    } else {
        Ok(Some(bytes))
    }
}

/// Builder for [`RestClient`].
pub struct RestClientBuilder {
    app_id: String,
    region_area: Option<RegionArea>,
    http_timeout: Duration,
    credential: Option<Arc<dyn Credential>>,
    logger: Option<Arc<dyn Logger>>,
    sender: Option<Arc<dyn HttpSender>>,
    host_resolver: Option<Arc<dyn HostResolver>>,
}

impl Default for RestClientBuilder {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            region_area: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            credential: None,
            logger: None,
            sender: None,
            host_resolver: None,
        }
    }
}

impl RestClientBuilder {
    /// Builder pre-filled from `config`.
    pub fn from_config(config: &ClientConfig) -> Self {
        let builder = Self::default()
            .app_id(config.app_id.clone())
            .region_area(config.region_area)
            .http_timeout(config.http_timeout());
        match &config.credential {
            Some(basic) => builder.credential(Arc::new(BasicAuthCredential::from(basic))),
            None => builder,
        }
    }

    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    pub fn region_area(mut self, area: RegionArea) -> Self {
        self.region_area = Some(area);
        self
    }

    /// Overall timeout of the default HTTP sender; zero selects the default.
    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = if timeout.is_zero() { DEFAULT_HTTP_TIMEOUT } else { timeout };
        self
    }

    pub fn credential(mut self, credential: Arc<dyn Credential>) -> Self {
        self.credential = Some(credential);
        self
    }

    pub fn basic_auth(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credential(Arc::new(BasicAuthCredential::new(username, password)))
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Replace the default reqwest-backed sender.
    pub fn sender(mut self, sender: Arc<dyn HttpSender>) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Replace the system DNS resolver used for domain selection.
    pub fn host_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.host_resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Result<RestClient> {
        let area = self
            .region_area
            .ok_or_else(|| RestError::InvalidArea("region area is required".into()))?;
        let logger = self.logger.unwrap_or_else(default_logger);

        let sender: Arc<dyn HttpSender> = match self.sender {
            Some(sender) => sender,
            None => Arc::new(ReqwestSender::new(self.http_timeout)?),
        };

        let pool = match self.host_resolver {
            Some(resolver) => DomainPool::with_resolver(area, Arc::clone(&logger), resolver),
            None => DomainPool::new(area, Arc::clone(&logger)),
        };

        let user_agent = HeaderValue::from_str(&user_agent()).map_err(|err| {
            let infra: InfraError = err.into();
            RestError::from(infra)
        })?;

        Ok(RestClient {
            app_id: self.app_id,
            pool,
            sender,
            credential: self.credential,
            logger,
            user_agent,
        })
    }
}

impl fmt::Debug for RestClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestClientBuilder")
            .field("app_id", &self.app_id)
            .field("region_area", &self.region_area)
            .field("http_timeout", &self.http_timeout)
            .field("credential", &self.credential)
            .finish_non_exhaustive()
    }
}
