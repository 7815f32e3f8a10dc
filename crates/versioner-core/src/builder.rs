//! Assemble the wire payload from validated inputs and pipeline context.

use chrono::{DateTime, Utc};
use versioner_domain::{
    merge_metadata, BuildEventPayload, DeploymentEventPayload, EventKind, EventPayload, InputError,
};

use crate::context::{PipelineContext, SOURCE_SYSTEM};
use crate::inputs::ActionInputs;

/// Product name from the input, else the repository name.
pub fn resolve_product_name(
    inputs: &ActionInputs,
    context: &PipelineContext,
) -> Result<String, InputError> {
    inputs
        .product_name
        .clone()
        .or_else(|| context.repository_name().map(str::to_string))
        .ok_or(InputError::MissingProductName)
}

/// Build the event payload. `now` stamps `started_at` for builds and
/// `completed_at` for deployments.
pub fn build_payload(
    inputs: &ActionInputs,
    context: &PipelineContext,
    now: DateTime<Utc>,
) -> Result<EventPayload, InputError> {
    let product_name = resolve_product_name(inputs, context)?;
    let extra_metadata = merge_metadata(&context.detected_metadata(), &inputs.metadata);

    let payload = match inputs.event_kind {
        EventKind::Build => EventPayload::Build(BuildEventPayload {
            product_name,
            version: inputs.version.clone(),
            status: inputs.status.clone(),
            build_number: context.run_number.clone(),
            build_url: context.build_url.clone(),
            scm_repository: context.repository.clone(),
            scm_sha: context.sha.clone(),
            scm_branch: context.branch.clone(),
            source_system: Some(SOURCE_SYSTEM.to_string()),
            invoke_id: context.run_id.clone(),
            built_by: context.actor.clone(),
            built_by_email: context.author_email.clone(),
            built_by_name: context.author_name.clone(),
            started_at: Some(now),
            skip_preflight_checks: inputs.skip_preflight_checks,
            extra_metadata,
            ..Default::default()
        }),
        EventKind::Deployment => EventPayload::Deployment(DeploymentEventPayload {
            product_name,
            version: inputs.version.clone(),
            environment_name: inputs
                .environment
                .clone()
                .ok_or(InputError::MissingEnvironment)?,
            status: inputs.status.clone(),
            scm_repository: context.repository.clone(),
            scm_sha: context.sha.clone(),
            scm_branch: context.branch.clone(),
            source_system: Some(SOURCE_SYSTEM.to_string()),
            build_number: context.run_number.clone(),
            invoke_id: context.run_id.clone(),
            build_url: context.build_url.clone(),
            deployed_by: context.actor.clone(),
            deployed_by_email: context.author_email.clone(),
            deployed_by_name: context.author_name.clone(),
            completed_at: Some(now),
            skip_preflight_checks: inputs.skip_preflight_checks,
            extra_metadata,
        }),
    };
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::RawInputs;
    use chrono::TimeZone;
    use serde_json::json;

    fn inputs(event_type: &str, metadata: &str) -> ActionInputs {
        ActionInputs::resolve(
            RawInputs {
                api_key: Some("key".to_string()),
                version: Some("3.1.0".to_string()),
                environment: Some("staging".to_string()),
                event_type: Some(event_type.to_string()),
                metadata: Some(metadata.to_string()),
                ..Default::default()
            },
            |_| None,
        )
        .unwrap()
    }

    fn context() -> PipelineContext {
        PipelineContext {
            repository: Some("acme/billing".to_string()),
            sha: Some("deadbeef".to_string()),
            branch: Some("main".to_string()),
            git_ref: Some("refs/heads/main".to_string()),
            run_number: Some("12".to_string()),
            run_id: Some("3456".to_string()),
            build_url: Some("https://github.com/acme/billing/actions/runs/3456".to_string()),
            actor: Some("octocat".to_string()),
            workflow: Some("CI".to_string()),
            ..Default::default()
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    #[test]
    fn deployment_payload_uses_repository_name_and_context() {
        let payload = build_payload(&inputs("deployment", "{}"), &context(), now()).unwrap();
        let EventPayload::Deployment(deployment) = &payload else {
            panic!("expected deployment payload");
        };
        assert_eq!(deployment.product_name, "billing");
        assert_eq!(deployment.environment_name, "staging");
        assert_eq!(deployment.deployed_by.as_deref(), Some("octocat"));
        assert_eq!(deployment.source_system.as_deref(), Some("github"));
        assert_eq!(deployment.completed_at, Some(now()));

        let wire = payload.to_json().unwrap();
        assert_eq!(wire["build_number"], json!("12"));
        assert_eq!(wire["invoke_id"], json!("3456"));
        assert_eq!(wire["extra_metadata"]["github_workflow"], json!("CI"));
    }

    #[test]
    fn build_payload_stamps_started_at() {
        let payload = build_payload(&inputs("build", "{}"), &context(), now()).unwrap();
        let EventPayload::Build(build) = payload else {
            panic!("expected build payload");
        };
        assert_eq!(build.started_at, Some(now()));
        assert_eq!(build.completed_at, None);
        assert_eq!(build.built_by.as_deref(), Some("octocat"));
        assert_eq!(build.scm_branch.as_deref(), Some("main"));
    }

    #[test]
    fn user_metadata_overrides_detected_keys() {
        let payload = build_payload(
            &inputs("deployment", r#"{"github_workflow": "custom", "team": "core"}"#),
            &context(),
            now(),
        )
        .unwrap();
        let metadata = payload.extra_metadata();
        assert_eq!(metadata.get("github_workflow"), Some(&json!("custom")));
        assert_eq!(metadata.get("team"), Some(&json!("core")));
        assert_eq!(metadata.get("github_ref"), Some(&json!("refs/heads/main")));
    }

    #[test]
    fn explicit_product_name_wins() {
        let mut inputs = inputs("deployment", "{}");
        inputs.product_name = Some("billing-api".to_string());
        assert_eq!(
            resolve_product_name(&inputs, &context()).unwrap(),
            "billing-api"
        );
    }

    #[test]
    fn missing_product_name_without_repository() {
        let err = build_payload(
            &inputs("deployment", "{}"),
            &PipelineContext::default(),
            now(),
        )
        .unwrap_err();
        assert_eq!(err, InputError::MissingProductName);
    }
}
