//! HTTP client for Cloudflare API
//!
//! Every typed operation funnels through [`Client::send`]: the call races the
//! caller's cancellation token, HTTP failures are classified into
//! [`Error`] variants, and successful bodies are decoded from the common
//! response envelope.

use std::sync::Arc;

use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::api::bulk::BulkPollSchedule;
use crate::api::error::{ApiError, Error, Result, TransportError};
use crate::api::response::{from_null, Envelope, ResponseInfo};
use crate::api::transport::{
    HttpTransport, RequestBody, Transport, TransportRequest, TransportResponse,
};
use crate::config::Config;

/// Response header carrying the request correlation id
pub const RAY_ID_HEADER: &str = "cf-ray";

/// Cloudflare API client
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    pub(crate) bulk_schedule: BulkPollSchedule,
}

impl Client {
    /// Create a client on top of any transport
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            bulk_schedule: BulkPollSchedule::default(),
        }
    }

    /// Create a client talking HTTP with the credentials in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    /// Replace the backoff schedule used while waiting on bulk operations
    pub fn with_bulk_schedule(mut self, schedule: BulkPollSchedule) -> Self {
        self.bulk_schedule = schedule;
        self
    }

    /// Issue a request and fail on any HTTP status >= 400.
    pub(crate) async fn send(
        &self,
        ctx: &CancellationToken,
        method: Method,
        path: String,
        body: Option<RequestBody>,
        headers: HeaderMap,
    ) -> Result<TransportResponse> {
        let request = TransportRequest {
            method,
            path,
            body,
            headers,
        };

        let response = tokio::select! {
            biased;
            _ = ctx.cancelled() => return Err(Error::Transport(TransportError::Canceled)),
            response = self.transport.send(request) => response.map_err(Error::Transport)?,
        };

        if response.status >= 400 {
            return Err(classify(&response));
        }
        Ok(response)
    }

    /// Issue a request and decode the response envelope.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        ctx: &CancellationToken,
        method: Method,
        path: String,
        body: Option<RequestBody>,
    ) -> Result<Envelope<T>> {
        let response = self.send(ctx, method, path, body, HeaderMap::new()).await?;
        decode_envelope(&response)
    }

    /// GET returning the envelope's `result`
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        ctx: &CancellationToken,
        path: String,
    ) -> Result<T> {
        let envelope = self.request(ctx, Method::GET, path, None).await?;
        into_result(envelope)
    }

    /// POST a JSON body
    pub(crate) async fn post<B, T>(
        &self,
        ctx: &CancellationToken,
        path: String,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = self
            .request(ctx, Method::POST, path, Some(json_body(body)?))
            .await?;
        into_result(envelope)
    }

    /// PUT a JSON body
    pub(crate) async fn put<B, T>(&self, ctx: &CancellationToken, path: String, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = self
            .request(ctx, Method::PUT, path, Some(json_body(body)?))
            .await?;
        into_result(envelope)
    }

    /// PATCH a JSON body
    pub(crate) async fn patch<B, T>(
        &self,
        ctx: &CancellationToken,
        path: String,
        body: &B,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let envelope = self
            .request(ctx, Method::PATCH, path, Some(json_body(body)?))
            .await?;
        into_result(envelope)
    }

    /// DELETE, optionally returning the deleted resource
    pub(crate) async fn delete<T: DeserializeOwned>(
        &self,
        ctx: &CancellationToken,
        path: String,
    ) -> Result<T> {
        let envelope = self.request(ctx, Method::DELETE, path, None).await?;
        into_result(envelope)
    }

    /// Make a raw request (returns the envelope's `result` as JSON)
    pub async fn raw(
        &self,
        ctx: &CancellationToken,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value> {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        let envelope: Envelope<Value> = self
            .request(ctx, method, path, body.map(RequestBody::Json))
            .await?;
        Ok(envelope.result.unwrap_or(Value::Null))
    }
}

pub(crate) fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody> {
    serde_json::to_value(body)
        .map(RequestBody::Json)
        .map_err(Error::Marshal)
}

fn ray_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(RAY_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Turn a failed HTTP response into its error variant.
///
/// Bodies that are not an envelope (proxy error pages, empty bodies) still
/// classify by status, with the raw text standing in for the error list.
pub(crate) fn classify(response: &TransportResponse) -> Error {
    let ray_id = ray_id(&response.headers);
    let api_error =
        match serde_json::from_slice::<Envelope<serde::de::IgnoredAny>>(&response.body) {
            Ok(envelope) => ApiError::new(
                response.status,
                envelope.errors,
                &envelope.messages,
                ray_id,
            ),
            Err(_) => {
                let text = String::from_utf8_lossy(&response.body).trim().to_string();
                let errors = if text.is_empty() {
                    vec![]
                } else {
                    vec![ResponseInfo {
                        code: 0,
                        message: text,
                    }]
                };
                ApiError::new(response.status, errors, &[], ray_id)
            }
        };

    debug!("API error ({}): {}", response.status, api_error);
    Error::from_status(response.status, api_error)
}

/// Decode a successful response body as an envelope.
pub(crate) fn decode_envelope<T: DeserializeOwned>(
    response: &TransportResponse,
) -> Result<Envelope<T>> {
    let envelope: Envelope<T> =
        serde_json::from_slice(&response.body).map_err(|source| Error::Unmarshal {
            source,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        })?;

    if !envelope.success {
        trace!("Envelope reported failure with status {}", response.status);
        return Err(Error::Request(ApiError::new(
            response.status,
            envelope.errors,
            &envelope.messages,
            ray_id(&response.headers),
        )));
    }

    Ok(envelope)
}

/// Extract `result`, accepting `null` only where `T` can represent it.
pub(crate) fn into_result<T: DeserializeOwned>(envelope: Envelope<T>) -> Result<T> {
    match envelope.result {
        Some(result) => Ok(result),
        None => from_null().ok_or_else(|| Error::Unmarshal {
            source: <serde_json::Error as serde::de::Error>::custom("response has no result"),
            body: String::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    fn response(status: u16, body: &str) -> TransportResponse {
        TransportResponse {
            status,
            headers: HeaderMap::new(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Item {
        id: String,
    }

    #[test]
    fn classifies_envelope_errors_with_ray_id() {
        let mut resp = response(
            403,
            r#"{"success":false,"errors":[{"code":10000,"message":"Authentication error"}],"messages":[]}"#,
        );
        resp.headers
            .insert(RAY_ID_HEADER, HeaderValue::from_static("8a1b2c3d4e5f-AMS"));

        let err = classify(&resp);
        assert!(matches!(err, Error::Authorization(_)));
        assert!(err.internal_error_code_is(10000));
        assert_eq!(err.ray_id(), Some("8a1b2c3d4e5f-AMS"));
        assert_eq!(err.status(), Some(403));
    }

    #[test]
    fn classifies_non_json_bodies_by_status() {
        let err = classify(&response(502, "<html>Bad gateway</html>"));
        assert!(matches!(err, Error::Service(_)));
        assert!(err.error_message_contains("Bad gateway"));

        let err = classify(&response(429, ""));
        assert!(err.is_rate_limited());
        assert_eq!(err.to_string(), "HTTP status 429");
    }

    #[test]
    fn success_false_is_a_request_error() {
        let err = decode_envelope::<Item>(&response(
            200,
            r#"{"success":false,"errors":[{"code":7003,"message":"Could not route"}],"messages":[{"code":0,"message":"hint"}],"result":null}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::Request(_)));
        assert_eq!(err.to_string(), "Could not route (7003)\nhint");
    }

    #[test]
    fn malformed_body_keeps_raw_text() {
        let err = decode_envelope::<Item>(&response(200, "{not json")).unwrap_err();
        match err {
            Error::Unmarshal { body, .. } => assert_eq!(body, "{not json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn extracts_result_or_accepts_null_for_unit() {
        let envelope = decode_envelope::<Item>(&response(
            200,
            r#"{"success":true,"errors":[],"messages":[],"result":{"id":"x"}}"#,
        ))
        .unwrap();
        assert_eq!(into_result(envelope).unwrap(), Item { id: "x".into() });

        let envelope =
            decode_envelope::<()>(&response(200, r#"{"success":true,"result":null}"#)).unwrap();
        assert!(into_result(envelope).is_ok());

        let envelope =
            decode_envelope::<Item>(&response(200, r#"{"success":true,"result":null}"#)).unwrap();
        assert!(matches!(into_result(envelope), Err(Error::Unmarshal { .. })));
    }
}
