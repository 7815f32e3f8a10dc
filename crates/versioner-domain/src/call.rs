//! The single API call: where it goes and what came back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::EventKind;

/// Hard ceiling on the API call, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Facts about the attempted call that shape user-facing messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub kind: EventKind,
    pub api_url: String,
    /// Version from the inputs, echoed on not-recorded receipts.
    pub version: String,
    pub timeout_secs: u64,
}

impl CallContext {
    pub fn new(kind: EventKind, api_url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind,
            api_url: api_url.into(),
            version: version.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Collection endpoint for this event kind.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.kind.endpoint_path()
        )
    }
}

/// Transport failures that never produced an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    ConnectionRefused,
    TimedOut,
    Other,
}

/// What the transport observed for the POST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RawCallResult {
    /// 2xx with a JSON body.
    Success { status: u16, body: Value },
    /// The server answered with a non-2xx status.
    HttpFailure {
        status: u16,
        reason: String,
        body: Option<Value>,
    },
    /// The request never got a response.
    Transport {
        kind: TransportErrorKind,
        message: String,
    },
}

impl RawCallResult {
    /// Build a result from a received status and body, splitting on 2xx.
    pub fn from_response(status: u16, body: Option<Value>) -> Self {
        if (200..300).contains(&status) {
            RawCallResult::Success {
                status,
                body: body.unwrap_or(Value::Null),
            }
        } else {
            RawCallResult::HttpFailure {
                status,
                reason: format!("Request failed with status code {status}"),
                body,
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            RawCallResult::Success { status, .. } | RawCallResult::HttpFailure { status, .. } => {
                Some(*status)
            }
            RawCallResult::Transport { .. } => None,
        }
    }

    pub fn body(&self) -> Option<&Value> {
        match self {
            RawCallResult::Success { body, .. } => Some(body),
            RawCallResult::HttpFailure { body, .. } => body.as_ref(),
            RawCallResult::Transport { .. } => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RawCallResult::Success { status, .. } if (200..300).contains(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_strips_trailing_slash() {
        let call = CallContext::new(EventKind::Deployment, "https://api.versioner.io/", "1.0.0");
        assert_eq!(call.endpoint(), "https://api.versioner.io/deployment-events/");

        let call = CallContext::new(EventKind::Build, "http://localhost:8000", "1.0.0");
        assert_eq!(call.endpoint(), "http://localhost:8000/build-events/");
    }

    #[test]
    fn from_response_splits_on_2xx() {
        let ok = RawCallResult::from_response(201, Some(json!({ "id": "x" })));
        assert!(ok.is_success());

        let failed = RawCallResult::from_response(500, None);
        assert!(!failed.is_success());
        assert_eq!(failed.status(), Some(500));
        assert!(failed.body().is_none());
    }
}
