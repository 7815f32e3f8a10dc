//! Outcome classification for the event API call.
//!
//! Decision order:
//! 1. 2xx: `Recorded`, even when identifiers are missing (warned only).
//! 2. 409 / 423 / 428: `Rejected`, before the policy flag is consulted.
//! 3. Everything else: `Fatal`, or `NotRecorded` when `fail_on_api_error`
//!    is off.

use serde_json::Value;
use tracing::warn;

use crate::call::{CallContext, RawCallResult, TransportErrorKind};
use crate::outcome::{ClassifiedOutcome, Rejection, RejectionCategory};
use crate::receipt::EventReceipt;

const UNKNOWN_CODE: &str = "UNKNOWN";
const UNKNOWN_RULE: &str = "Unknown Rule";

/// Local policy for API and transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyPolicy {
    pub fail_on_api_error: bool,
}

impl Default for ClassifyPolicy {
    fn default() -> Self {
        Self {
            fail_on_api_error: true,
        }
    }
}

impl ClassifyPolicy {
    pub fn new(fail_on_api_error: bool) -> Self {
        Self { fail_on_api_error }
    }
}

/// Whether a status code is a server-side policy rejection.
pub fn is_rejection_status(status: u16) -> bool {
    RejectionCategory::from_status(status).is_some()
}

/// Classify the result of the event API call.
pub fn classify(
    call: &CallContext,
    result: &RawCallResult,
    policy: ClassifyPolicy,
) -> ClassifiedOutcome {
    if let RawCallResult::Success { status, body } = result {
        if (200..300).contains(status) {
            return classify_success(call, *status, body);
        }
    }

    // Rejections are decided before the policy flag is looked at.
    if let Some(category) = result.status().and_then(RejectionCategory::from_status) {
        return ClassifiedOutcome::Rejected(Box::new(rejection_from_body(
            call,
            category,
            result.body(),
        )));
    }

    let message = api_error_message(call, result);
    if policy.fail_on_api_error {
        ClassifiedOutcome::Fatal {
            kind: call.kind,
            message,
        }
    } else {
        ClassifiedOutcome::NotRecorded {
            kind: call.kind,
            message,
        }
    }
}

fn classify_success(call: &CallContext, status: u16, body: &Value) -> ClassifiedOutcome {
    let (receipt, missing) = EventReceipt::from_response(call.kind, body);
    if !missing.is_empty() {
        warn!(
            event = "response.missing_identifiers",
            kind = %call.kind,
            status = status,
            missing = ?missing,
            "⚠️ API response is missing identifier fields"
        );
    }
    ClassifiedOutcome::Recorded(receipt)
}

fn str_field(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Read rejection facts from `{"detail": {...}}`, a string `detail`, or a flat body.
fn rejection_from_body(
    call: &CallContext,
    category: RejectionCategory,
    body: Option<&Value>,
) -> Rejection {
    let default_message = format!("{} rejected by Versioner", call.kind.title());

    let source = match body.and_then(|b| b.get("detail")) {
        Some(detail) if detail.is_object() => Some(detail),
        Some(Value::String(message)) => {
            return Rejection::new(
                call.kind,
                category,
                UNKNOWN_CODE.to_string(),
                message.clone(),
                UNKNOWN_RULE.to_string(),
                None,
                None,
            );
        }
        _ => body.filter(|b| b.is_object()),
    };

    let Some(source) = source else {
        return Rejection::new(
            call.kind,
            category,
            UNKNOWN_CODE.to_string(),
            default_message,
            UNKNOWN_RULE.to_string(),
            None,
            None,
        );
    };

    let details = source.get("details").filter(|d| !d.is_null()).cloned();
    let rule_name = details
        .as_ref()
        .and_then(|d| str_field(d, "rule_name"))
        .or_else(|| str_field(source, "rule_name"))
        .unwrap_or_else(|| UNKNOWN_RULE.to_string());

    Rejection::new(
        call.kind,
        category,
        str_field(source, "code").unwrap_or_else(|| UNKNOWN_CODE.to_string()),
        str_field(source, "message")
            .or_else(|| str_field(source, "error"))
            .unwrap_or(default_message),
        rule_name,
        str_field(source, "retry_after"),
        details,
    )
}

fn raw_body(body: Option<&Value>) -> String {
    match body {
        Some(Value::String(s)) => s.clone(),
        Some(value) => value.to_string(),
        None => "no response body".to_string(),
    }
}

/// Actionable message for an API or transport error.
fn api_error_message(call: &CallContext, result: &RawCallResult) -> String {
    match result {
        RawCallResult::HttpFailure { status: 401, .. } => {
            "Authentication failed: Invalid API key. Please check your VERSIONER_API_KEY secret."
                .to_string()
        }
        RawCallResult::HttpFailure { status: 403, .. } => format!(
            "Authorization failed: API key does not have permission to create {} events.",
            call.kind
        ),
        RawCallResult::HttpFailure { status: 404, .. } => format!(
            "API endpoint not found. Please check your api_url: {}",
            call.api_url
        ),
        RawCallResult::HttpFailure {
            status: 422, body, ..
        } => format!("Validation error: {}", raw_body(body.as_ref())),
        RawCallResult::Transport {
            kind: TransportErrorKind::ConnectionRefused,
            ..
        } => format!(
            "Connection refused: Unable to connect to {}. Please check the API URL.",
            call.api_url
        ),
        RawCallResult::Transport {
            kind: TransportErrorKind::TimedOut,
            ..
        } => format!(
            "Request timeout: The API did not respond within {} seconds. Please try again.",
            call.timeout_secs
        ),
        RawCallResult::HttpFailure {
            status,
            reason,
            body,
        } => generic_message(call, Some(*status), reason, body.as_ref()),
        RawCallResult::Transport { message, .. } => generic_message(call, None, message, None),
        // A non-2xx status smuggled in a Success variant.
        RawCallResult::Success { status, body } => {
            generic_message(call, Some(*status), "Unexpected status", Some(body))
        }
    }
}

fn generic_message(
    call: &CallContext,
    status: Option<u16>,
    reason: &str,
    body: Option<&Value>,
) -> String {
    let status = status.map_or_else(|| "unknown".to_string(), |s| s.to_string());
    let reason = if reason.is_empty() {
        "Unknown error"
    } else {
        reason
    };
    let response = match body {
        Some(Value::Null) | None => String::new(),
        Some(value) => format!("\nResponse: {value}"),
    };
    format!(
        "Failed to send {} event (HTTP {status}): {reason}{response}",
        call.kind
    )
}
