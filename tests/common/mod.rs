//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

use cfapi::{
    BulkPollSchedule, Client, Config, HttpTransport, RetryPolicy, Transport, TransportError,
    TransportRequest, TransportResponse,
};

pub const ACCOUNT_ID: &str = "01a7362d577a6c3019a474fd6f485823";
pub const ZONE_ID: &str = "023e105f4ecef8ad9ca31a8372d0c353";

/// Successful envelope around `result`
pub fn envelope(result: Value) -> Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result
    })
}

/// Successful envelope with pagination info
pub fn paged(result: Value, result_info: Value) -> Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result,
        "result_info": result_info
    })
}

/// Failed envelope with one error
pub fn failure(code: i64, message: &str) -> Value {
    json!({
        "success": false,
        "errors": [{"code": code, "message": message}],
        "messages": [],
        "result": null
    })
}

pub fn no_retries() -> RetryPolicy {
    RetryPolicy {
        max_retries: 0,
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    }
}

pub fn instant_retries(max_retries: u32) -> RetryPolicy {
    RetryPolicy {
        max_retries,
        min_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(1),
    }
}

pub fn fast_bulk() -> BulkPollSchedule {
    BulkPollSchedule {
        steps: 16,
        base: Duration::from_millis(1),
    }
}

/// Client on the real HTTP transport pointed at `base_url`
pub fn http_client(base_url: &str, retry: RetryPolicy) -> Client {
    let config = Config::with_token("test-token").base_url(base_url);
    let transport = HttpTransport::with_retry_policy(&config, retry).expect("valid config");
    Client::new(Arc::new(transport)).with_bulk_schedule(fast_bulk())
}

/// In-memory transport that records requests and replays canned responses
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<TransportRequest>>,
    responses: Mutex<VecDeque<TransportResponse>>,
    cancel_after: Mutex<Option<(usize, CancellationToken)>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a JSON response
    pub fn respond(&self, status: u16, body: Value) {
        self.responses.lock().unwrap().push_back(TransportResponse {
            status,
            headers: HeaderMap::new(),
            body: body.to_string().into_bytes(),
        });
    }

    /// Cancel `token` once `calls` requests have been served
    pub fn cancel_after(&self, calls: usize, token: CancellationToken) {
        *self.cancel_after.lock().unwrap() = Some((calls, token));
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.path.clone())
            .collect()
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let served = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };
        if let Some((calls, token)) = self.cancel_after.lock().unwrap().as_ref() {
            if served >= *calls {
                token.cancel();
            }
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::Other("no response queued".into()))
    }
}

pub fn recording_client(transport: &Arc<RecordingTransport>) -> Client {
    Client::new(transport.clone()).with_bulk_schedule(fast_bulk())
}
