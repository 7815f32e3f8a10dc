//! Transport seam for the single event POST.
//!
//! Implementations never return errors: every observation, including
//! connection failures, is folded into a [`RawCallResult`] for the
//! classifier to judge.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;
use versioner_domain::{RawCallResult, TransportErrorKind, DEFAULT_TIMEOUT_SECS};

pub const USER_AGENT: &str = concat!("versioner-track/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait EventTransport: Send + Sync {
    /// POST `body` to `endpoint` with bearer authentication.
    async fn post(&self, endpoint: &str, api_key: &str, body: &Value) -> RawCallResult;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// JSON when possible, otherwise the raw text as a JSON string.
fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

fn transport_failure(err: &reqwest::Error) -> RawCallResult {
    let kind = if err.is_timeout() {
        TransportErrorKind::TimedOut
    } else if err.is_connect() {
        TransportErrorKind::ConnectionRefused
    } else {
        TransportErrorKind::Other
    };
    RawCallResult::Transport {
        kind,
        message: err.to_string(),
    }
}

#[async_trait]
impl EventTransport for HttpTransport {
    async fn post(&self, endpoint: &str, api_key: &str, body: &Value) -> RawCallResult {
        let response = match self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!(endpoint = %endpoint, error = %err, "Request failed before a response");
                return transport_failure(&err);
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) if err.is_timeout() => return transport_failure(&err),
            Err(err) => {
                debug!(status = status, error = %err, "Could not read response body");
                String::new()
            }
        };
        debug!(status = status, body = %text, "Received API response");

        RawCallResult::from_response(status, parse_body(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_body_is_parsed() {
        assert_eq!(parse_body(r#"{"id": "b1"}"#), Some(json!({ "id": "b1" })));
    }

    #[test]
    fn non_json_body_is_kept_as_string() {
        assert_eq!(
            parse_body("<html>Bad Gateway</html>"),
            Some(json!("<html>Bad Gateway</html>"))
        );
    }

    #[test]
    fn empty_body_is_absent() {
        assert_eq!(parse_body(""), None);
        assert_eq!(parse_body("  \n"), None);
    }

    #[test]
    fn user_agent_names_the_tool() {
        assert!(USER_AGENT.starts_with("versioner-track/"));
    }

    #[test]
    fn default_timeout_is_thirty_seconds() {
        let transport = HttpTransport::new().unwrap();
        assert_eq!(transport.timeout(), Duration::from_secs(30));
    }
}
