//! Versioner Core Library
//!
//! Runtime pieces around the pure domain crate: input resolution, GitHub
//! context detection, payload assembly, the HTTP transport, step I/O and
//! the [`Tracker`] that drives one run.

pub mod builder;
pub mod context;
pub mod fakes;
pub mod inputs;
pub mod links;
pub mod obs;
pub mod step_io;
pub mod telemetry;
pub mod tracker;
pub mod transport;

pub use builder::{build_payload, resolve_product_name};
pub use context::PipelineContext;
pub use inputs::{ActionInputs, RawInputs, DEFAULT_API_URL};
pub use links::{ui_base_url, view_url};
pub use step_io::{StepIo, StepIoError};
pub use telemetry::{init_tracing, runner_debug_enabled};
pub use tracker::Tracker;
pub use transport::{EventTransport, HttpTransport, USER_AGENT};

pub use versioner_domain::{
    ClassifiedOutcome, EventKind, EventReceipt, InputError, TrackerError, NOT_RECORDED_STATUS,
};
