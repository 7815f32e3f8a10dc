//! Classified outcomes of an event submission.

use std::fmt;

use serde_json::Value;

use crate::call::CallContext;
use crate::error::TrackerError;
use crate::event::EventKind;
use crate::receipt::EventReceipt;
use crate::summary::{self, EventSummaryReport};

/// Policy rejection categories, one per rejection status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionCategory {
    /// 409: another operation of the same kind is in progress.
    Conflict,
    /// 423: a scheduled no-deploy window is active.
    ScheduleBlocked,
    /// 428: a required prior step or approval is missing.
    PreconditionFailed,
}

impl RejectionCategory {
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            409 => Some(RejectionCategory::Conflict),
            423 => Some(RejectionCategory::ScheduleBlocked),
            428 => Some(RejectionCategory::PreconditionFailed),
            _ => None,
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            RejectionCategory::Conflict => 409,
            RejectionCategory::ScheduleBlocked => 423,
            RejectionCategory::PreconditionFailed => 428,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            RejectionCategory::Conflict => "⚠️",
            RejectionCategory::ScheduleBlocked => "🔒",
            RejectionCategory::PreconditionFailed => "❌",
        }
    }

    /// Heading without icon, e.g. "Deployment Conflict".
    pub fn heading(&self, kind: EventKind) -> String {
        let suffix = match self {
            RejectionCategory::Conflict => "Conflict",
            RejectionCategory::ScheduleBlocked => "Blocked by Schedule",
            RejectionCategory::PreconditionFailed => "Precondition Failed",
        };
        format!("{} {}", kind.title(), suffix)
    }
}

/// Known 428 error codes. Anything else maps to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreconditionCode {
    FlowViolation,
    InsufficientSoakTime,
    ApprovalRequired,
    Other,
}

impl PreconditionCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "FLOW_VIOLATION" => PreconditionCode::FlowViolation,
            "INSUFFICIENT_SOAK_TIME" => PreconditionCode::InsufficientSoakTime,
            "QUALITY_APPROVAL_REQUIRED" | "APPROVAL_REQUIRED" => PreconditionCode::ApprovalRequired,
            _ => PreconditionCode::Other,
        }
    }
}

/// A server-side policy rejection.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub kind: EventKind,
    pub category: RejectionCategory,
    pub code: String,
    pub message: String,
    pub rule_name: String,
    pub retry_after: Option<String>,
    pub details: Option<Value>,
    /// Step summary rendered when the rejection was classified.
    pub report: EventSummaryReport,
}

impl Rejection {
    pub fn new(
        kind: EventKind,
        category: RejectionCategory,
        code: String,
        message: String,
        rule_name: String,
        retry_after: Option<String>,
        details: Option<Value>,
    ) -> Self {
        let mut rejection = Rejection {
            kind,
            category,
            code,
            message,
            rule_name,
            retry_after,
            details,
            report: EventSummaryReport::default(),
        };
        rejection.report = summary::rejection_report(&rejection);
        rejection
    }

    pub fn status(&self) -> u16 {
        self.category.status()
    }

    pub fn precondition_code(&self) -> PreconditionCode {
        PreconditionCode::from_code(&self.code)
    }

    /// The step failure reason shown to the user.
    pub fn failure_message(&self) -> String {
        let mut out = format!(
            "{} {}\n\n",
            self.category.icon(),
            self.category.heading(self.kind)
        );

        match self.category {
            RejectionCategory::Conflict => {
                out.push_str(&format!("{}\n", self.message));
                out.push_str(&format!(
                    "Another {} is in progress. Please wait and retry.",
                    self.kind
                ));
            }
            RejectionCategory::ScheduleBlocked => {
                out.push_str(&format!("Rule: {}\n", self.rule_name));
                out.push_str(&format!("{}\n", self.message));
                if let Some(retry_after) = &self.retry_after {
                    out.push_str(&format!("\nRetry after: {retry_after}"));
                }
            }
            RejectionCategory::PreconditionFailed => {
                out.push_str(&format!("Error: {}\n", self.code));
                out.push_str(&format!("Rule: {}\n", self.rule_name));
                out.push_str(&format!("{}\n", self.message));
                if let Some(retry_after) = &self.retry_after {
                    out.push_str(&format!("\nRetry after: {retry_after}"));
                }

                let guidance = match self.precondition_code() {
                    PreconditionCode::FlowViolation => {
                        "Deploy to required environments first, then retry.".to_string()
                    }
                    PreconditionCode::InsufficientSoakTime => {
                        "Wait for soak time to complete, then retry.".to_string()
                    }
                    PreconditionCode::ApprovalRequired => format!(
                        "Approval required before {} can proceed.\nObtain approval via Versioner UI, then retry.",
                        self.kind
                    ),
                    PreconditionCode::Other => {
                        "Resolve the issue described above, then retry.".to_string()
                    }
                };
                out.push_str(&format!("\n\n{guidance}"));

                if let Some(details) = &self.details {
                    let pretty = serde_json::to_string_pretty(details)
                        .unwrap_or_else(|_| details.to_string());
                    out.push_str(&format!("\n\nDetails: {pretty}"));
                }
            }
        }
        out
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.failure_message())
    }
}

/// The classified result of one event submission.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedOutcome {
    /// The event was recorded.
    Recorded(EventReceipt),
    /// An API or transport error, demoted because `fail_on_api_error` is off.
    NotRecorded { kind: EventKind, message: String },
    /// The remote policy refused the event. Always fails the step.
    Rejected(Box<Rejection>),
    /// An API or transport error that fails the step.
    Fatal { kind: EventKind, message: String },
}

impl ClassifiedOutcome {
    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ClassifiedOutcome::Recorded(_) => "recorded",
            ClassifiedOutcome::NotRecorded { .. } => "not_recorded",
            ClassifiedOutcome::Rejected(_) => "rejected",
            ClassifiedOutcome::Fatal { .. } => "fatal",
        }
    }

    /// Whether the caller must fail the step.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            ClassifiedOutcome::Rejected(_) | ClassifiedOutcome::Fatal { .. }
        )
    }

    /// Summary report produced during classification, if any.
    pub fn report(&self) -> Option<&EventSummaryReport> {
        match self {
            ClassifiedOutcome::Rejected(rejection) => Some(&rejection.report),
            _ => None,
        }
    }

    /// Convert to the caller-facing result.
    ///
    /// `NotRecorded` becomes a placeholder receipt echoing the input version.
    pub fn into_receipt(self, call: &CallContext) -> Result<EventReceipt, TrackerError> {
        match self {
            ClassifiedOutcome::Recorded(receipt) => Ok(receipt),
            ClassifiedOutcome::NotRecorded { kind, .. } => {
                Ok(EventReceipt::not_recorded(kind, &call.version))
            }
            ClassifiedOutcome::Rejected(rejection) => Err(TrackerError::Rejected(rejection)),
            ClassifiedOutcome::Fatal { message, .. } => Err(TrackerError::Api(message)),
        }
    }
}
