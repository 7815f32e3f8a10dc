//! Wire payloads for build and deployment events.
//!
//! Optional fields that are absent or empty are omitted from the JSON body;
//! the API distinguishes "not sent" from "sent empty".

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::EventKind;

/// Free-form metadata attached to an event.
pub type Metadata = BTreeMap<String, Value>;

/// Merge auto-detected metadata with user metadata. User keys always win.
pub fn merge_metadata(detected: &Metadata, user: &Metadata) -> Metadata {
    let mut merged = detected.clone();
    merged.extend(user.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Body of `POST /deployment-events/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeploymentEventPayload {
    pub product_name: String,
    pub version: String,
    pub environment_name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub scm_repository: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub scm_sha: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub scm_branch: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub source_system: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub build_number: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub invoke_id: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub build_url: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub deployed_by: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub deployed_by_email: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub deployed_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_preflight_checks: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_metadata: Metadata,
}

/// Body of `POST /build-events/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BuildEventPayload {
    pub product_name: String,
    pub version: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub build_number: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub build_url: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub scm_repository: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub scm_sha: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub scm_branch: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub source_system: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub invoke_id: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub built_by: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub built_by_email: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub built_by_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub skip_preflight_checks: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_metadata: Metadata,
}

/// An event payload, serialized as the bare variant body.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum EventPayload {
    Build(BuildEventPayload),
    Deployment(DeploymentEventPayload),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Build(_) => EventKind::Build,
            EventPayload::Deployment(_) => EventKind::Deployment,
        }
    }

    pub fn product_name(&self) -> &str {
        match self {
            EventPayload::Build(p) => &p.product_name,
            EventPayload::Deployment(p) => &p.product_name,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            EventPayload::Build(p) => &p.version,
            EventPayload::Deployment(p) => &p.version,
        }
    }

    pub fn status(&self) -> &str {
        match self {
            EventPayload::Build(p) => &p.status,
            EventPayload::Deployment(p) => &p.status,
        }
    }

    pub fn extra_metadata(&self) -> &Metadata {
        match self {
            EventPayload::Build(p) => &p.extra_metadata,
            EventPayload::Deployment(p) => &p.extra_metadata,
        }
    }

    /// Serialize to the JSON value sent as the request body.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
