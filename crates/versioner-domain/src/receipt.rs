//! Identifiers returned by the API for a recorded event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::EventKind;

/// Status marker for events that were skipped after a demoted API error.
pub const NOT_RECORDED_STATUS: &str = "not_recorded";

/// Server-assigned identifiers for an event, in one schema for both kinds.
///
/// `id` is the deployment id for deployments and the build id for builds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventReceipt {
    pub kind: EventKind,
    pub id: String,
    pub event_id: String,
    pub product_id: String,
    pub version_id: String,
    pub environment_id: String,
    pub version: String,
    pub status: String,
    pub created_at: Option<String>,
}

fn first_str(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match body.get(*key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

impl EventReceipt {
    /// Read a receipt from a 2xx response body.
    ///
    /// Returns the receipt and the expected identifier fields that were
    /// missing; missing fields become empty strings.
    pub fn from_response(kind: EventKind, body: &Value) -> (Self, Vec<&'static str>) {
        let (id_keys, event_keys, created_keys): (&[&str], &[&str], &[&str]) = match kind {
            EventKind::Deployment => (
                &["deployment_id", "id"],
                &["event_id"],
                &["created_at", "deployed_at"],
            ),
            EventKind::Build => (&["id", "build_id"], &["event_id", "id"], &["created_at", "started_at"]),
        };

        let id = first_str(body, id_keys);
        let event_id = first_str(body, event_keys);
        let version_id = first_str(body, &["version_id"]);

        let mut missing = Vec::new();
        match kind {
            EventKind::Deployment => {
                if id.is_none() {
                    missing.push("deployment_id");
                }
                if event_id.is_none() {
                    missing.push("event_id");
                }
            }
            EventKind::Build => {
                if id.is_none() {
                    missing.push("id");
                }
                if version_id.is_none() {
                    missing.push("version_id");
                }
            }
        }

        let receipt = EventReceipt {
            kind,
            id: id.unwrap_or_default(),
            event_id: event_id.unwrap_or_default(),
            product_id: first_str(body, &["product_id"]).unwrap_or_default(),
            version_id: version_id.unwrap_or_default(),
            environment_id: first_str(body, &["environment_id"]).unwrap_or_default(),
            version: first_str(body, &["version"]).unwrap_or_default(),
            status: first_str(body, &["status"]).unwrap_or_default(),
            created_at: first_str(body, created_keys),
        };
        (receipt, missing)
    }

    /// Placeholder receipt for an event that was not recorded.
    pub fn not_recorded(kind: EventKind, version: &str) -> Self {
        EventReceipt {
            kind,
            id: String::new(),
            event_id: String::new(),
            product_id: String::new(),
            version_id: String::new(),
            environment_id: String::new(),
            version: version.to_string(),
            status: NOT_RECORDED_STATUS.to_string(),
            created_at: None,
        }
    }

    pub fn is_recorded(&self) -> bool {
        self.status != NOT_RECORDED_STATUS
    }

    /// Step outputs exposed to later pipeline steps.
    pub fn outputs(&self) -> Vec<(&'static str, String)> {
        let mut outputs = match self.kind {
            EventKind::Deployment => vec![
                ("deployment_id", self.id.clone()),
                ("event_id", self.event_id.clone()),
                ("product_id", self.product_id.clone()),
            ],
            EventKind::Build => vec![
                ("build_id", self.id.clone()),
                ("version_id", self.version_id.clone()),
                ("product_id", self.product_id.clone()),
            ],
        };
        outputs.push(("status", self.status.clone()));
        outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deployment_receipt_reads_all_identifiers() {
        let body = json!({
            "deployment_id": "dep-1",
            "event_id": "evt-1",
            "product_id": "prod-1",
            "version_id": "ver-1",
            "environment_id": "env-1",
            "status": "success",
            "created_at": "2026-01-01T00:00:00Z"
        });

        let (receipt, missing) = EventReceipt::from_response(EventKind::Deployment, &body);
        assert!(missing.is_empty());
        assert_eq!(receipt.id, "dep-1");
        assert_eq!(receipt.event_id, "evt-1");
        assert_eq!(receipt.environment_id, "env-1");
        assert_eq!(receipt.created_at.as_deref(), Some("2026-01-01T00:00:00Z"));
        assert!(receipt.is_recorded());
    }

    #[test]
    fn build_receipt_reports_missing_version_id() {
        let body = json!({ "id": "b-9", "product_id": "p", "version": "2.0.0" });

        let (receipt, missing) = EventReceipt::from_response(EventKind::Build, &body);
        assert_eq!(missing, vec!["version_id"]);
        assert_eq!(receipt.id, "b-9");
        assert_eq!(receipt.event_id, "b-9");
        assert_eq!(receipt.version, "2.0.0");
        assert_eq!(receipt.version_id, "");
    }

    #[test]
    fn not_recorded_receipt_has_empty_identifiers() {
        let receipt = EventReceipt::not_recorded(EventKind::Build, "3.1.0");
        assert!(!receipt.is_recorded());
        assert_eq!(receipt.status, NOT_RECORDED_STATUS);
        assert_eq!(receipt.version, "3.1.0");
        assert!(receipt.id.is_empty() && receipt.product_id.is_empty());
    }

    #[test]
    fn outputs_follow_event_kind() {
        let receipt = EventReceipt::not_recorded(EventKind::Deployment, "1.0.0");
        let names: Vec<&str> = receipt.outputs().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["deployment_id", "event_id", "product_id", "status"]);

        let receipt = EventReceipt::not_recorded(EventKind::Build, "1.0.0");
        let names: Vec<&str> = receipt.outputs().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["build_id", "version_id", "product_id", "status"]);
    }
}
