//! Transport contract and the default reqwest-backed implementation
//!
//! The client only needs to hand a method, path, optional body and extra
//! headers to a [`Transport`] and get back status, headers and raw bytes.
//! Authentication, retries and rate-limit backoff live on this side, as
//! `reqwest-middleware` layers around the HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use http::Extensions;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, Request, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::api::error::{Result, TransportError};
use crate::config::Config;

const USER_AGENT: &str = concat!("cfapi/", env!("CARGO_PKG_VERSION"));

/// Request body handed to the transport
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Encoded as JSON by the transport
    Json(Value),
    /// Sent verbatim; the caller supplies `Content-Type`
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Endpoint path including query string, e.g. `/accounts/abc/rules/lists?page=2`
    pub path: String,
    pub body: Option<RequestBody>,
    pub headers: HeaderMap,
}

#[derive(Debug, Clone, Default)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Capability the client needs from the HTTP layer
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// Retry schedule for transient failures: network errors, HTTP 429 and 5xx
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Doubling backoff from `min_delay`, capped at `max_delay`.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::builder()
            .retry_bounds(self.min_delay, self.max_delay)
            .build_with_max_retries(self.max_retries)
    }
}

/// Holds back a throttled or failed response until its `Retry-After` delay
/// has passed, so the retry middleware wrapping it does not retry early.
#[derive(Debug, Clone, Copy)]
struct RetryAfterMiddleware {
    max_delay: Duration,
}

#[async_trait]
impl Middleware for RetryAfterMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let response = next.run(req, extensions).await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            if let Some(delay) = retry_after(response.headers()) {
                let delay = delay.min(self.max_delay);
                warn!(
                    "{} returned {}, server asked to wait {:?}",
                    response.url(),
                    status,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
        }
        Ok(response)
    }
}

/// HTTP transport for the Cloudflare API
pub struct HttpTransport {
    client: ClientWithMiddleware,
    base_url: String,
    auth_headers: Vec<(&'static str, String)>,
}

impl HttpTransport {
    /// Create a transport authenticating with the credentials in `config`
    pub fn new(config: &Config) -> Result<Self> {
        Self::build(config, RetryPolicy::default())
    }

    /// Create a transport with a non-default retry schedule
    pub fn with_retry_policy(config: &Config, retry: RetryPolicy) -> Result<Self> {
        Self::build(config, retry)
    }

    fn build(config: &Config, retry: RetryPolicy) -> Result<Self> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(TransportError::from)
            .map_err(crate::Error::Transport)?;

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry.backoff()))
            .with(RetryAfterMiddleware {
                max_delay: retry.max_delay,
            })
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            auth_headers: config.auth_headers(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> std::result::Result<TransportResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        debug!("{} {}", request.method, url);

        let mut req = self.client.request(request.method.clone(), &url);
        for (key, value) in &self.auth_headers {
            req = req.header(*key, value);
        }

        req = match request.body {
            Some(RequestBody::Json(body)) => {
                trace!("Request body: {}", body);
                req.json(&body)
            }
            Some(RequestBody::Bytes(bytes)) => req.body(bytes),
            None => req.header(CONTENT_TYPE, "application/json"),
        };
        // Caller-supplied headers win over the defaults above.
        req = req.headers(request.headers);

        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        trace!("Response ({}): {}", status, String::from_utf8_lossy(&body));

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Seconds from a `Retry-After` header
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Build a header map from static name/value pairs.
pub(crate) fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    map
}
