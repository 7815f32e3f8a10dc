//! In-memory transport fake (testing only)
//!
//! `FakeTransport` answers every POST with a canned [`RawCallResult`] and
//! records what it was asked to send.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use versioner_domain::{RawCallResult, TransportErrorKind};

use crate::transport::EventTransport;

/// A POST captured by [`FakeTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub endpoint: String,
    pub api_key: String,
    pub body: Value,
}

#[derive(Debug)]
pub struct FakeTransport {
    response: RawCallResult,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeTransport {
    pub fn new(response: RawCallResult) -> Self {
        Self {
            response,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Respond with `status` and a JSON body.
    pub fn responding(status: u16, body: Value) -> Self {
        Self::new(RawCallResult::from_response(status, Some(body)))
    }

    /// Fail every request before a response arrives.
    pub fn failing(kind: TransportErrorKind) -> Self {
        Self::new(RawCallResult::Transport {
            kind,
            message: format!("{kind:?}"),
        })
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl EventTransport for FakeTransport {
    async fn post(&self, endpoint: &str, api_key: &str, body: &Value) -> RawCallResult {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(RecordedRequest {
                endpoint: endpoint.to_string(),
                api_key: api_key.to_string(),
                body: body.clone(),
            });
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn records_requests_and_replays_response() {
        let fake = FakeTransport::responding(201, json!({ "id": "b1" }));
        let result = fake
            .post("https://api.example.com/build-events/", "k", &json!({ "version": "1" }))
            .await;

        assert!(result.is_success());
        let requests = fake.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].endpoint, "https://api.example.com/build-events/");
        assert_eq!(requests[0].body["version"], json!("1"));
    }

    #[tokio::test]
    async fn failing_fake_returns_transport_error() {
        let fake = FakeTransport::failing(TransportErrorKind::TimedOut);
        let result = fake.post("http://x", "k", &json!({})).await;
        assert_eq!(result.status(), None);
    }
}
