//! Versioner Domain Model
//!
//! Pure types and decision logic for reporting CI/CD events to Versioner:
//! - EventPayload: what happened (build or deployment), as sent on the wire
//! - RawCallResult: what the transport observed for the single POST
//! - ClassifiedOutcome: Recorded, NotRecorded, Rejected or Fatal
//! - EventReceipt: identifiers handed back to the pipeline as step outputs
//! - EventSummaryReport: Markdown rendered for the step summary
//!
//! Nothing in this crate performs I/O apart from `tracing` diagnostics.

pub mod call;
pub mod classifier;
pub mod error;
pub mod event;
pub mod outcome;
pub mod payload;
pub mod receipt;
pub mod summary;

pub use call::{CallContext, RawCallResult, TransportErrorKind, DEFAULT_TIMEOUT_SECS};
pub use classifier::{classify, is_rejection_status, ClassifyPolicy};
pub use error::{InputError, Result, TrackerError};
pub use event::EventKind;
pub use outcome::{ClassifiedOutcome, PreconditionCode, Rejection, RejectionCategory};
pub use payload::{
    merge_metadata, BuildEventPayload, DeploymentEventPayload, EventPayload, Metadata,
};
pub use receipt::{EventReceipt, NOT_RECORDED_STATUS};
pub use summary::{render, render_success, EventSummaryReport, SuccessSummary};

/// Versioner domain version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
