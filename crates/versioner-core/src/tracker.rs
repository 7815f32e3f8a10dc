//! One tracking run: build, send, classify, report.

use chrono::Utc;
use tracing::{debug, info, warn};
use versioner_domain::{
    classify, render, render_success, CallContext, ClassifiedOutcome, EventKind, EventPayload,
    EventReceipt, SuccessSummary, TrackerError, DEFAULT_TIMEOUT_SECS,
};

use crate::builder::build_payload;
use crate::context::PipelineContext;
use crate::inputs::ActionInputs;
use crate::links::view_url;
use crate::obs;
use crate::step_io::{self, StepIo};
use crate::transport::EventTransport;

pub struct Tracker<T> {
    transport: T,
    step_io: StepIo,
    timeout_secs: u64,
}

impl<T: EventTransport> Tracker<T> {
    pub fn new(transport: T, step_io: StepIo) -> Self {
        Self {
            transport,
            step_io,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Timeout quoted in timeout messages; match the transport's.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Report one event. Returns the receipt for recorded and not-recorded
    /// outcomes; rejections and fatal errors come back as `Err`.
    pub async fn run(
        &self,
        inputs: &ActionInputs,
        context: &PipelineContext,
    ) -> Result<EventReceipt, TrackerError> {
        info!("📦 Versioner Deployment Tracker");
        info!("================================");

        let payload = build_payload(inputs, context, Utc::now())?;
        log_facts(inputs, context, &payload);

        let call = CallContext::new(inputs.event_kind, &inputs.api_url, &inputs.version)
            .with_timeout_secs(self.timeout_secs);
        let endpoint = call.endpoint();
        let body = payload.to_json()?;

        info!("Sending {} event to Versioner...", inputs.event_kind);
        obs::emit_event_sending(
            inputs.event_kind,
            &endpoint,
            payload.product_name(),
            payload.version(),
        );
        debug!(payload = %body, "Event payload");

        let result = self.transport.post(&endpoint, &inputs.api_key, &body).await;
        let outcome = classify(&call, &result, inputs.policy());
        obs::emit_event_classified(inputs.event_kind, outcome.label(), result.status());

        match &outcome {
            ClassifiedOutcome::Recorded(receipt) => {
                self.report_recorded(inputs, context, &payload, receipt);
            }
            ClassifiedOutcome::NotRecorded { message, .. } => {
                step_io::warning(&format!("⚠️ {message}"));
                warn!("⚠️ {message}");
                info!("Continuing workflow (fail_on_api_error is false)");
                self.write_summary(&render(&outcome));
            }
            ClassifiedOutcome::Rejected(rejection) => {
                self.write_summary(&rejection.report.to_markdown());
            }
            ClassifiedOutcome::Fatal { .. } => {
                self.write_summary(&render(&outcome));
            }
        }

        let receipt = outcome.into_receipt(&call)?;
        self.write_outputs(&receipt);
        Ok(receipt)
    }

    fn report_recorded(
        &self,
        inputs: &ActionInputs,
        context: &PipelineContext,
        payload: &EventPayload,
        receipt: &EventReceipt,
    ) {
        info!("");
        info!("✅ {} tracked successfully!", inputs.event_kind.title());
        match receipt.kind {
            EventKind::Build => {
                info!("   Build ID: {}", receipt.id);
                info!("   Version ID: {}", receipt.version_id);
            }
            EventKind::Deployment => {
                info!("   Deployment ID: {}", receipt.id);
                info!("   Event ID: {}", receipt.event_id);
            }
        }
        info!("   Product ID: {}", receipt.product_id);

        let product = payload.product_name();
        let notice = match inputs.event_kind {
            EventKind::Build => format!(
                "Build tracked: {product}@{} ({})",
                inputs.version, inputs.status
            ),
            EventKind::Deployment => format!(
                "Deployment tracked: {product}@{} → {} ({})",
                inputs.version,
                inputs.environment.as_deref().unwrap_or_default(),
                inputs.status
            ),
        };
        step_io::notice(&notice);

        let summary = SuccessSummary {
            kind: inputs.event_kind,
            version: inputs.version.clone(),
            status: inputs.status.clone(),
            scm_sha: context.sha.clone().unwrap_or_default(),
            environment: inputs.environment.clone(),
            view_url: view_url(&inputs.api_url, receipt),
        };
        self.write_summary(&render_success(&summary));
    }

    fn write_summary(&self, markdown: &str) {
        if let Err(e) = self.step_io.append_summary(markdown) {
            obs::emit_step_io_error("summary", &e);
            step_io::warning(&format!("Failed to write step summary: {e}"));
        }
    }

    fn write_outputs(&self, receipt: &EventReceipt) {
        if let Err(e) = self.step_io.set_outputs(&receipt.outputs()) {
            obs::emit_step_io_error("outputs", &e);
            step_io::warning(&format!("Failed to set step outputs: {e}"));
        }
    }
}

fn log_facts(inputs: &ActionInputs, context: &PipelineContext, payload: &EventPayload) {
    info!("Event Type: {}", inputs.event_kind);
    info!("Product: {}", payload.product_name());
    info!("Version: {}", inputs.version);
    if let Some(environment) = &inputs.environment {
        info!("Environment: {environment}");
    }
    info!("Status: {}", inputs.status);
    info!(
        "Repository: {}",
        context.repository.as_deref().unwrap_or("unknown")
    );
    info!("SHA: {}", context.sha.as_deref().unwrap_or("unknown"));
    info!(
        "Deployed by: {}",
        context.actor.as_deref().unwrap_or("unknown")
    );
    info!("");
}
