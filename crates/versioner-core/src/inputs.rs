//! Action input resolution and validation.
//!
//! Raw values come from flags or `INPUT_*` variables; `VERSIONER_*`
//! variables are consulted as fallbacks through an injected lookup so the
//! resolver stays testable without touching the process environment.

use std::fmt;

use serde_json::Value;
use versioner_domain::{ClassifyPolicy, EventKind, InputError, Metadata};

pub const DEFAULT_API_URL: &str = "https://api.versioner.io";
pub const DEFAULT_STATUS: &str = "success";

/// Inputs as provided, before defaults and validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInputs {
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub product_name: Option<String>,
    pub version: Option<String>,
    pub environment: Option<String>,
    pub event_type: Option<String>,
    pub status: Option<String>,
    pub metadata: Option<String>,
    pub fail_on_rejection: Option<String>,
    /// Older name for `fail_on_rejection`; wins when both are set.
    pub fail_on_api_error: Option<String>,
    pub skip_preflight_checks: Option<String>,
}

/// Validated inputs for a single tracking run.
#[derive(Clone, PartialEq)]
pub struct ActionInputs {
    pub api_url: String,
    pub api_key: String,
    /// `None` means "use the repository name".
    pub product_name: Option<String>,
    pub version: String,
    pub environment: Option<String>,
    pub event_kind: EventKind,
    pub status: String,
    pub metadata: Metadata,
    pub fail_on_api_error: bool,
    pub skip_preflight_checks: bool,
}

impl fmt::Debug for ActionInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionInputs")
            .field("api_url", &self.api_url)
            .field("api_key", &"***")
            .field("product_name", &self.product_name)
            .field("version", &self.version)
            .field("environment", &self.environment)
            .field("event_kind", &self.event_kind)
            .field("status", &self.status)
            .field("metadata", &self.metadata)
            .field("fail_on_api_error", &self.fail_on_api_error)
            .field("skip_preflight_checks", &self.skip_preflight_checks)
            .finish()
    }
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(value: Option<String>, default: bool) -> bool {
    match present(value) {
        Some(v) => v.eq_ignore_ascii_case("true"),
        None => default,
    }
}

/// Parse the `metadata` input; absent means an empty map.
pub fn parse_metadata(raw: Option<&str>) -> Result<Metadata, InputError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(Metadata::new());
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map.into_iter().collect()),
        Ok(_) => Err(InputError::MetadataNotObject),
        Err(e) => Err(InputError::InvalidMetadata(e.to_string())),
    }
}

impl ActionInputs {
    /// Resolve from the process environment.
    pub fn from_env(raw: RawInputs) -> Result<Self, InputError> {
        Self::resolve(raw, |key| std::env::var(key).ok())
    }

    /// Apply defaults and fallbacks, then validate.
    pub fn resolve<F>(raw: RawInputs, env: F) -> Result<Self, InputError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let version = present(raw.version).ok_or(InputError::MissingVersion)?;

        let api_key = present(raw.api_key)
            .or_else(|| present(env("VERSIONER_API_KEY")))
            .ok_or(InputError::MissingApiKey)?;

        let api_url = present(raw.api_url)
            .or_else(|| present(env("VERSIONER_API_URL")))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(InputError::InvalidApiUrl);
        }

        let event_kind = match present(raw.event_type) {
            Some(value) => value.parse::<EventKind>()?,
            None => EventKind::default(),
        };

        let environment = present(raw.environment);
        if event_kind == EventKind::Deployment && environment.is_none() {
            return Err(InputError::MissingEnvironment);
        }

        let metadata = parse_metadata(raw.metadata.as_deref())?;

        let fail_on_api_error = parse_flag(raw.fail_on_api_error.or(raw.fail_on_rejection), true);

        Ok(Self {
            api_url,
            api_key,
            product_name: present(raw.product_name),
            version,
            environment,
            event_kind,
            status: present(raw.status).unwrap_or_else(|| DEFAULT_STATUS.to_string()),
            metadata,
            fail_on_api_error,
            skip_preflight_checks: parse_flag(raw.skip_preflight_checks, false),
        })
    }

    pub fn policy(&self) -> ClassifyPolicy {
        ClassifyPolicy::new(self.fail_on_api_error)
    }
}
