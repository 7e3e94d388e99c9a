//! Shared fakes for the infra integration tests.

use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use agora_rest_common::DiscardLogger;
use agora_rest_domain::{RegionArea, RestError, Result};
use agora_rest_infra::{HostResolver, HttpSender, ReqwestSender, RestClient};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Request, Response, Url};

// ============================================================================
// DNS
// ============================================================================

/// Resolves every host ending in one of `ok_suffixes`; counts lookups.
pub struct FakeResolver {
    ok_suffixes: Vec<&'static str>,
    lookups: AtomicUsize,
}

impl FakeResolver {
    pub fn resolving(ok_suffixes: &[&'static str]) -> Arc<Self> {
        Arc::new(Self { ok_suffixes: ok_suffixes.to_vec(), lookups: AtomicUsize::new(0) })
    }

    pub fn failing() -> Arc<Self> {
        Self::resolving(&[])
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostResolver for FakeResolver {
    async fn lookup(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.ok_suffixes.iter().any(|suffix| host.ends_with(suffix)) {
            Ok(vec![IpAddr::from([127, 0, 0, 1])])
        } else {
            Err(io::Error::new(io::ErrorKind::NotFound, format!("no such host {host}")))
        }
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// What a sender saw for one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: reqwest::Method,
    pub url: Url,
    pub headers: reqwest::header::HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    fn capture(request: &Request) -> Self {
        Self {
            method: request.method().clone(),
            url: request.url().clone(),
            headers: request.headers().clone(),
            body: request.body().and_then(reqwest::Body::as_bytes).map(<[u8]>::to_vec),
        }
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// Canned outcome for one request.
pub enum Reply {
    Status(u16, &'static str),
    StatusWithHeader(u16, &'static str, &'static str, &'static str),
    NetworkError(&'static str),
}

type Script = Box<dyn Fn(&RecordedRequest) -> Reply + Send + Sync>;

/// In-memory sender answering from a script and recording every request.
pub struct ScriptedSender {
    script: Script,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedSender {
    pub fn new<F>(script: F) -> Arc<Self>
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self { script: Box::new(script), requests: Mutex::new(Vec::new()) })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn hosts(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.host().to_string()).collect()
    }
}

fn response(status: u16, body: &'static str, header: Option<(&str, &str)>) -> Response {
    let mut builder = http::Response::builder().status(status);
    if let Some((name, value)) = header {
        builder = builder.header(name, value);
    }
    Response::from(builder.body(body).unwrap())
}

#[async_trait]
impl HttpSender for ScriptedSender {
    async fn send(&self, request: Request) -> Result<Response> {
        let recorded = RecordedRequest::capture(&request);
        let reply = (self.script)(&recorded);
        self.requests.lock().push(recorded);

        match reply {
            Reply::Status(status, body) => Ok(response(status, body, None)),
            Reply::StatusWithHeader(status, body, name, value) => {
                Ok(response(status, body, Some((name, value))))
            }
            Reply::NetworkError(message) => Err(RestError::Network(message.to_string())),
        }
    }
}

/// Real reqwest sender that rewrites every request onto a local server,
/// keeping the original host for inspection.
pub struct RedirectSender {
    target: Url,
    inner: ReqwestSender,
    hosts: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RedirectSender {
    pub fn new(target: &str) -> Arc<Self> {
        Self::with_timeout(target, Duration::from_secs(5))
    }

    /// Redirecting sender whose reqwest client has the given overall timeout.
    pub fn with_timeout(target: &str, timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            target: Url::parse(target).unwrap(),
            inner: ReqwestSender::new(timeout).unwrap(),
            hosts: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        })
    }

    pub fn hosts(&self) -> Vec<String> {
        self.hosts.lock().clone()
    }

    /// Display text of every error the inner sender returned, in order.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }
}

#[async_trait]
impl HttpSender for RedirectSender {
    async fn send(&self, mut request: Request) -> Result<Response> {
        let original = request.url().clone();
        self.hosts.lock().push(original.host_str().unwrap_or_default().to_string());

        let mut url = self.target.clone();
        url.set_path(original.path());
        url.set_query(original.query());
        *request.url_mut() = url;

        let result = self.inner.send(request).await;
        if let Err(err) = &result {
            self.errors.lock().push(err.to_string());
        }
        result
    }
}

// ============================================================================
// Client
// ============================================================================

pub fn client(
    area: RegionArea,
    resolver: Arc<dyn HostResolver>,
    sender: Arc<dyn HttpSender>,
) -> RestClient {
    RestClient::builder()
        .app_id("test-app")
        .region_area(area)
        .basic_auth("customer-key", "customer-secret")
        .logger(Arc::new(DiscardLogger::new()))
        .host_resolver(resolver)
        .sender(sender)
        .build()
        .unwrap()
}
