//! Links from API results into the Versioner web UI.

use url::Url;
use versioner_domain::{EventKind, EventReceipt};

/// UI origin paired with an API URL.
pub fn ui_base_url(api_url: &str) -> String {
    let host = Url::parse(api_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string));

    match host.as_deref() {
        Some("api.versioner.io") => "https://app.versioner.io".to_string(),
        Some("development-api.versioner.io") => "https://dev.versioner.io".to_string(),
        _ => api_url.trim_end_matches('/').replacen("api", "app", 1),
    }
}

/// Page for the recorded version (builds) or deployment.
pub fn view_url(api_url: &str, receipt: &EventReceipt) -> String {
    let base = ui_base_url(api_url);
    match receipt.kind {
        EventKind::Build => format!("{base}/manage/versions?view={}", receipt.version_id),
        EventKind::Deployment => format!("{base}/deployments/{}", receipt.id),
    }
}
