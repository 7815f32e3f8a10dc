//! Structured lifecycle events for a tracking run.
//!
//! Each helper emits one `event = "..."` line so JSON logs can be filtered
//! by event name.

use tracing::{info, warn};
use versioner_domain::EventKind;

/// Emit event: the payload is about to be sent.
pub fn emit_event_sending(kind: EventKind, endpoint: &str, product: &str, version: &str) {
    info!(
        event = "event.sending",
        kind = %kind,
        endpoint = %endpoint,
        product = %product,
        version = %version,
    );
}

/// Emit event: the call result was classified.
pub fn emit_event_classified(kind: EventKind, outcome: &str, status: Option<u16>) {
    info!(
        event = "event.classified",
        kind = %kind,
        outcome = %outcome,
        status = ?status,
    );
}

/// Emit event: an output or summary write failed (warning level).
pub fn emit_step_io_error(sink: &str, error: &dyn std::fmt::Display) {
    warn!(event = "step_io.error", sink = %sink, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_do_not_panic_without_subscriber() {
        emit_event_sending(
            EventKind::Deployment,
            "https://api.versioner.io/deployment-events/",
            "billing",
            "1.0.0",
        );
        emit_event_classified(EventKind::Build, "recorded", Some(201));
        emit_step_io_error("summary", &"disk full");
    }
}
