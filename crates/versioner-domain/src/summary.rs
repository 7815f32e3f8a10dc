//! Step summary rendering.
//!
//! Renders Markdown for the pipeline's visual summary. Pure: writing the
//! string to `GITHUB_STEP_SUMMARY` is the caller's job.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::EventKind;
use crate::outcome::{ClassifiedOutcome, PreconditionCode, Rejection, RejectionCategory};
use crate::receipt::EventReceipt;

const SKIP_PREFLIGHT_HINT: &str = "Or use `skip_preflight_checks: true` for emergencies";

/// A rendered block describing an outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventSummaryReport {
    /// Level-2 heading.
    pub title: String,
    /// Optional level-3 heading below the title.
    pub heading: Option<String>,
    /// `(label, value)` bullets; values are already Markdown.
    pub facts: Vec<(String, String)>,
    /// "Action Required" steps.
    pub guidance: Vec<String>,
    /// Raw details, pretty-printed as a JSON block.
    pub details: Option<Value>,
}

impl EventSummaryReport {
    pub fn to_markdown(&self) -> String {
        let mut md = format!("## {}\n\n", self.title);

        if let Some(heading) = &self.heading {
            md.push_str(&format!("### {heading}\n\n"));
        }

        for (label, value) in &self.facts {
            md.push_str(&format!("- **{label}:** {value}\n"));
        }

        if !self.guidance.is_empty() {
            md.push_str("\n**Action Required:**\n");
            for step in &self.guidance {
                md.push_str(&format!("- {step}\n"));
            }
        }

        if let Some(details) = &self.details {
            let pretty =
                serde_json::to_string_pretty(details).unwrap_or_else(|_| details.to_string());
            md.push_str("\n**Details:**\n```json\n");
            md.push_str(&pretty);
            md.push_str("\n```\n");
        }

        md
    }
}

fn has_content(details: &Value) -> bool {
    match details {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Guidance steps for a rejection, chosen by category and error code.
pub fn rejection_guidance(rejection: &Rejection) -> Vec<String> {
    let kind = rejection.kind;
    let retry_after = rejection.retry_after.as_deref();
    let mut steps = Vec::new();

    match rejection.category {
        RejectionCategory::Conflict => {
            steps.push(format!("Wait for the current {kind} to complete"));
            steps.push(format!("Retry this {kind}"));
        }
        RejectionCategory::ScheduleBlocked => {
            if let Some(retry_after) = retry_after {
                steps.push(format!("Wait until `{retry_after}`"));
                steps.push("Retry automatically after the no-deploy window".to_string());
            }
            steps.push(SKIP_PREFLIGHT_HINT.to_string());
        }
        RejectionCategory::PreconditionFailed => match rejection.precondition_code() {
            PreconditionCode::FlowViolation => {
                steps.push("Deploy to required environments first".to_string());
                steps.push(format!("Then retry this {kind}"));
            }
            PreconditionCode::InsufficientSoakTime => {
                steps.push("Wait for the soak time requirement to be met".to_string());
                if let Some(retry_after) = retry_after {
                    steps.push(format!("Can deploy at: `{retry_after}`"));
                }
                steps.push(SKIP_PREFLIGHT_HINT.to_string());
            }
            PreconditionCode::ApprovalRequired => {
                steps.push("Obtain required approval via Versioner UI".to_string());
                steps.push(format!("Then retry this {kind}"));
            }
            PreconditionCode::Other => {
                steps.push("Resolve the issue described above".to_string());
                steps.push(format!("Then retry this {kind}"));
                steps.push(SKIP_PREFLIGHT_HINT.to_string());
            }
        },
    }
    steps
}

/// Report for a policy rejection.
pub fn rejection_report(rejection: &Rejection) -> EventSummaryReport {
    let mut facts = vec![
        ("Error Code".to_string(), format!("`{}`", rejection.code)),
        ("Rule".to_string(), rejection.rule_name.clone()),
        ("Message".to_string(), rejection.message.clone()),
    ];
    if let Some(retry_after) = &rejection.retry_after {
        facts.push(("Retry After".to_string(), format!("`{retry_after}`")));
    }

    EventSummaryReport {
        title: format!("❌ Versioner {} Rejected", rejection.kind.title()),
        heading: Some(format!(
            "{} {}",
            rejection.category.icon(),
            rejection.category.heading(rejection.kind)
        )),
        facts,
        guidance: rejection_guidance(rejection),
        details: rejection.details.clone().filter(has_content),
    }
}

fn receipt_report(receipt: &EventReceipt) -> EventSummaryReport {
    let mut facts = vec![("ID".to_string(), format!("`{}`", receipt.id))];
    if !receipt.event_id.is_empty() && receipt.event_id != receipt.id {
        facts.push(("Event ID".to_string(), format!("`{}`", receipt.event_id)));
    }
    if !receipt.product_id.is_empty() {
        facts.push(("Product ID".to_string(), format!("`{}`", receipt.product_id)));
    }
    if !receipt.version.is_empty() {
        facts.push(("Version".to_string(), format!("`{}`", receipt.version)));
    }
    facts.push(("Status".to_string(), receipt.status.clone()));

    EventSummaryReport {
        title: format!("✅ Versioner {} Recorded", receipt.kind.title()),
        facts,
        ..Default::default()
    }
}

/// Render any classified outcome as Markdown.
pub fn render(outcome: &ClassifiedOutcome) -> String {
    let report = match outcome {
        ClassifiedOutcome::Recorded(receipt) => receipt_report(receipt),
        ClassifiedOutcome::Rejected(rejection) => rejection.report.clone(),
        ClassifiedOutcome::NotRecorded { kind, message } => EventSummaryReport {
            title: format!("⚠️ Versioner {} Not Recorded", kind.title()),
            facts: vec![("Message".to_string(), message.clone())],
            guidance: vec![
                "The workflow continued because `fail_on_api_error` is false".to_string(),
                format!("Fix the problem above to record future {kind} events"),
            ],
            ..Default::default()
        },
        ClassifiedOutcome::Fatal { kind, message } => EventSummaryReport {
            title: format!("❌ Versioner {} Event Failed", kind.title()),
            facts: vec![("Message".to_string(), message.clone())],
            ..Default::default()
        },
    };
    report.to_markdown()
}

/// Facts shown in the success summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessSummary {
    pub kind: EventKind,
    pub version: String,
    pub status: String,
    pub scm_sha: String,
    pub environment: Option<String>,
    /// Link into the Versioner UI for the recorded resource.
    pub view_url: String,
}

fn status_emoji(status: &str) -> &'static str {
    match status {
        "success" => "✅",
        "failure" => "❌",
        "in_progress" => "🔄",
        _ => "⚠️",
    }
}

/// Render the "Versioner Summary" block written after a recorded event.
pub fn render_success(summary: &SuccessSummary) -> String {
    let mut md = String::from("## 🚀 Versioner Summary\n\n");
    md.push_str(&format!("**Action:** {}\n\n", summary.kind.title()));
    if summary.kind == EventKind::Deployment {
        if let Some(environment) = &summary.environment {
            md.push_str(&format!("**Environment:** {environment}\n\n"));
        }
    }
    md.push_str(&format!(
        "**Status:** {} {}\n\n",
        status_emoji(&summary.status),
        summary.status
    ));
    md.push_str(&format!("**Version:** `{}`\n\n", summary.version));
    md.push_str(&format!("**Git SHA:** `{}`\n\n", summary.scm_sha));
    md.push_str(&format!("[View in Versioner →]({})\n", summary.view_url));
    md
}
