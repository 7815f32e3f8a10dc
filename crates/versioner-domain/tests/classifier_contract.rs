use serde_json::{json, Value};
use versioner_domain::{
    classify, render, CallContext, ClassifiedOutcome, ClassifyPolicy, EventKind, RawCallResult,
    TrackerError, TransportErrorKind, NOT_RECORDED_STATUS,
};

fn deployment_call() -> CallContext {
    CallContext::new(EventKind::Deployment, "https://api.versioner.io", "1.0.0")
}

fn build_call() -> CallContext {
    CallContext::new(EventKind::Build, "https://api.versioner.io", "2.4.1")
}

fn http(status: u16, body: Value) -> RawCallResult {
    RawCallResult::from_response(status, Some(body))
}

fn transport(kind: TransportErrorKind) -> RawCallResult {
    RawCallResult::Transport {
        kind,
        message: "transport".to_string(),
    }
}

fn rejection_body(code: &str, message: &str) -> Value {
    json!({
        "detail": {
            "message": message,
            "code": code,
            "details": { "rule_name": "Staging required" },
        }
    })
}

// ---- Rejections ignore the policy flag ----

#[test]
fn rejection_statuses_always_fail_regardless_of_flag() {
    for status in [409, 423, 428] {
        for fail_on_api_error in [true, false] {
            let outcome = classify(
                &deployment_call(),
                &http(status, rejection_body("SOME_CODE", "nope")),
                ClassifyPolicy::new(fail_on_api_error),
            );
            assert!(
                matches!(outcome, ClassifiedOutcome::Rejected(_)),
                "status {status} with flag {fail_on_api_error} should be rejected"
            );
            let err = outcome.into_receipt(&deployment_call()).unwrap_err();
            assert!(err.is_rejection());
        }
    }
}

#[test]
fn rejection_branch_runs_before_policy_branch() {
    // With the flag off, a 409 must not be demoted the way a 500 is.
    let policy = ClassifyPolicy::new(false);
    let conflict = classify(&deployment_call(), &http(409, json!({})), policy);
    let server_error = classify(&deployment_call(), &http(500, json!({})), policy);

    assert_eq!(conflict.label(), "rejected");
    assert_eq!(server_error.label(), "not_recorded");
}

#[test]
fn deployment_in_progress_scenario() {
    let body = json!({
        "detail": { "message": "Deployment in progress", "code": "DEPLOYMENT_IN_PROGRESS" }
    });

    for fail_on_api_error in [true, false] {
        let outcome = classify(
            &deployment_call(),
            &http(409, body.clone()),
            ClassifyPolicy::new(fail_on_api_error),
        );
        let err = outcome.into_receipt(&deployment_call()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Deployment Conflict"));
        assert!(message.contains("Deployment in progress"));
    }
}

#[test]
fn schedule_block_scenario() {
    let body = json!({
        "detail": {
            "message": "No-deploy window active",
            "code": "NO_DEPLOY_WINDOW",
            "details": { "rule_name": "Friday freeze" },
            "retry_after": "2026-10-19T08:00:00Z"
        }
    });
    let outcome = classify(&deployment_call(), &http(423, body), ClassifyPolicy::new(false));
    let ClassifiedOutcome::Rejected(rejection) = &outcome else {
        panic!("expected rejection");
    };
    assert_eq!(rejection.rule_name, "Friday freeze");
    assert_eq!(rejection.retry_after.as_deref(), Some("2026-10-19T08:00:00Z"));

    let err = outcome.into_receipt(&deployment_call()).unwrap_err();
    assert!(err.to_string().contains("Deployment Blocked by Schedule"));
}

// ---- Guidance selection ----

fn precondition_report(code: &str) -> String {
    let outcome = classify(
        &deployment_call(),
        &http(428, rejection_body(code, "Precondition failed")),
        ClassifyPolicy::default(),
    );
    outcome.report().expect("rejection carries a report").to_markdown()
}

#[test]
fn flow_violation_guidance() {
    let md = precondition_report("FLOW_VIOLATION");
    assert!(md.contains("### ❌ Deployment Precondition Failed"));
    assert!(md.contains("Deploy to required environments first"));
}

#[test]
fn insufficient_soak_time_guidance() {
    let md = precondition_report("INSUFFICIENT_SOAK_TIME");
    assert!(md.contains("Wait for the soak time requirement to be met"));
}

#[test]
fn unknown_precondition_code_falls_back_to_generic_guidance() {
    let md = precondition_report("SOME_NEW_CODE");
    assert!(md.contains("- **Error Code:** `SOME_NEW_CODE`"));
    assert!(md.contains("Resolve the issue described above"));
    assert!(md.contains("Then retry this deployment"));
}

#[test]
fn rejection_report_includes_details_block() {
    let md = precondition_report("FLOW_VIOLATION");
    assert!(md.contains("**Details:**\n```json\n"));
    assert!(md.contains("\"rule_name\": \"Staging required\""));
}

// ---- API errors and the policy flag ----

#[test]
fn unauthorized_with_flag_on_is_fatal() {
    let outcome = classify(&deployment_call(), &http(401, json!({})), ClassifyPolicy::new(true));
    let ClassifiedOutcome::Fatal { message, .. } = &outcome else {
        panic!("expected fatal");
    };
    assert!(message.contains("Authentication failed"));

    let err = outcome.into_receipt(&deployment_call()).unwrap_err();
    assert!(matches!(err, TrackerError::Api(_)));
}

#[test]
fn unauthorized_with_flag_off_is_not_recorded() {
    let outcome = classify(&deployment_call(), &http(401, json!({})), ClassifyPolicy::new(false));
    let ClassifiedOutcome::NotRecorded { message, .. } = &outcome else {
        panic!("expected not recorded");
    };
    assert!(message.contains("Authentication failed"));

    let receipt = outcome.into_receipt(&deployment_call()).unwrap();
    assert_eq!(receipt.status, NOT_RECORDED_STATUS);
    assert!(receipt.id.is_empty());
    assert!(receipt.event_id.is_empty());
    assert!(receipt.product_id.is_empty());
}

#[test]
fn forbidden_message_names_event_kind() {
    let outcome = classify(&build_call(), &http(403, json!({})), ClassifyPolicy::default());
    let ClassifiedOutcome::Fatal { message, .. } = outcome else {
        panic!("expected fatal");
    };
    assert!(message.contains("Authorization failed"));
    assert!(message.contains("create build events"));
}

#[test]
fn transport_errors_with_flag_off_are_not_recorded() {
    let refused = classify(
        &deployment_call(),
        &transport(TransportErrorKind::ConnectionRefused),
        ClassifyPolicy::new(false),
    );
    let ClassifiedOutcome::NotRecorded { message, .. } = refused else {
        panic!("expected not recorded");
    };
    assert!(message.contains("refused"));

    let timed_out = classify(
        &deployment_call(),
        &transport(TransportErrorKind::TimedOut),
        ClassifyPolicy::new(false),
    );
    let ClassifiedOutcome::NotRecorded { message, .. } = timed_out else {
        panic!("expected not recorded");
    };
    assert!(message.to_lowercase().contains("timeout"));
    assert!(message.contains("30 seconds"));
}

#[test]
fn build_not_found_scenario_echoes_version() {
    let call = build_call();
    assert_eq!(call.endpoint(), "https://api.versioner.io/build-events/");

    let outcome = classify(&call, &http(404, json!({})), ClassifyPolicy::new(false));
    let ClassifiedOutcome::NotRecorded { message, .. } = &outcome else {
        panic!("expected not recorded");
    };
    assert!(message.to_lowercase().contains("endpoint not found"));

    let receipt = outcome.into_receipt(&call).unwrap();
    assert_eq!(receipt.version, "2.4.1");
    assert_eq!(receipt.status, NOT_RECORDED_STATUS);
}

// ---- Success ----

#[test]
fn success_round_trips_identifiers() {
    let body = json!({
        "deployment_id": "7b0c6a1e-dep",
        "event_id": "f3a9-evt",
        "product_id": "prod-42",
        "version_id": "ver-7",
        "environment_id": "env-prod",
        "status": "success",
        "created_at": "2026-10-16T12:00:00Z"
    });
    let outcome = classify(
        &deployment_call(),
        &RawCallResult::from_response(201, Some(body)),
        ClassifyPolicy::default(),
    );
    let receipt = outcome.into_receipt(&deployment_call()).unwrap();
    assert_eq!(receipt.id, "7b0c6a1e-dep");
    assert_eq!(receipt.event_id, "f3a9-evt");
    assert_eq!(receipt.product_id, "prod-42");
    assert_eq!(receipt.version_id, "ver-7");
    assert_eq!(receipt.environment_id, "env-prod");
}

#[test]
fn classification_is_deterministic() {
    let cases = vec![
        http(201, json!({ "id": "b1", "version_id": "v1", "product_id": "p1" })),
        http(428, rejection_body("FLOW_VIOLATION", "flow")),
        http(401, json!({})),
        http(502, json!("bad gateway")),
        transport(TransportErrorKind::TimedOut),
    ];

    for result in &cases {
        for policy in [ClassifyPolicy::new(true), ClassifyPolicy::new(false)] {
            let first = classify(&build_call(), result, policy);
            let second = classify(&build_call(), result, policy);
            assert_eq!(first, second);
            assert_eq!(render(&first), render(&second));
        }
    }
}
