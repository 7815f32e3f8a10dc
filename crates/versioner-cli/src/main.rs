//! Versioner Tracker - report CI/CD events to Versioner
//!
//! The `versioner-track` command sends one build or deployment event from a
//! pipeline step. Every flag also reads the matching GitHub Actions
//! `INPUT_*` variable, so the binary runs unchanged as an action entrypoint.
//!
//! Exit status is 0 when the event was recorded, or when an API error was
//! tolerated with `fail_on_rejection: false`. Policy rejections always exit 1.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, Level};

use versioner_core::{
    init_tracing, runner_debug_enabled, step_io, ActionInputs, HttpTransport, PipelineContext,
    RawInputs, StepIo, Tracker,
};
use versioner_domain::{EventKind, EventReceipt, DEFAULT_TIMEOUT_SECS};

#[derive(Parser, Debug)]
#[command(name = "versioner-track")]
#[command(author = "Versioner")]
#[command(version = env!("CARGO_PKG_VERSION"), disable_version_flag = true)]
#[command(about = "Track builds and deployments in Versioner", long_about = None)]
struct Cli {
    /// Enable verbose output (also enabled by RUNNER_DEBUG=1)
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,

    /// Versioner API base URL (falls back to VERSIONER_API_URL)
    #[arg(long, env = "INPUT_API_URL")]
    api_url: Option<String>,

    /// Versioner API key (falls back to VERSIONER_API_KEY)
    #[arg(long, env = "INPUT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Product name (defaults to the repository name)
    #[arg(long, env = "INPUT_PRODUCT_NAME")]
    product_name: Option<String>,

    /// Version being built or deployed (replaces the usual --version flag)
    #[arg(long, env = "INPUT_VERSION")]
    version: Option<String>,

    /// Target environment (required for deployments)
    #[arg(long, env = "INPUT_ENVIRONMENT")]
    environment: Option<String>,

    /// Event type: build or deployment
    #[arg(long, env = "INPUT_EVENT_TYPE")]
    event_type: Option<String>,

    /// Event status, e.g. success, failure, in_progress
    #[arg(long, env = "INPUT_STATUS")]
    status: Option<String>,

    /// Extra metadata as a JSON object
    #[arg(long, env = "INPUT_METADATA")]
    metadata: Option<String>,

    /// Fail the step on API errors ("true"/"false"); rejections always fail
    #[arg(long, env = "INPUT_FAIL_ON_REJECTION")]
    fail_on_rejection: Option<String>,

    /// Older name for --fail-on-rejection
    #[arg(long, env = "INPUT_FAIL_ON_API_ERROR")]
    fail_on_api_error: Option<String>,

    /// Ask Versioner to skip preflight policy checks ("true"/"false")
    #[arg(long, env = "INPUT_SKIP_PREFLIGHT_CHECKS")]
    skip_preflight_checks: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,
}

impl Cli {
    fn raw_inputs(&self) -> RawInputs {
        RawInputs {
            api_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            product_name: self.product_name.clone(),
            version: self.version.clone(),
            environment: self.environment.clone(),
            event_type: self.event_type.clone(),
            status: self.status.clone(),
            metadata: self.metadata.clone(),
            fail_on_rejection: self.fail_on_rejection.clone(),
            fail_on_api_error: self.fail_on_api_error.clone(),
            skip_preflight_checks: self.skip_preflight_checks.clone(),
        }
    }

    /// Event name used in the failure line, even when inputs are invalid.
    fn event_label(&self) -> &'static str {
        match self.event_type.as_deref().map(str::trim) {
            None | Some("") => EventKind::default().as_str(),
            Some(value) => value.parse::<EventKind>().map_or("event", |k| k.as_str()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose || runner_debug_enabled() {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    match run(&cli).await {
        Ok(receipt) => {
            debug!(status = %receipt.status, id = %receipt.id, "Tracking finished");
            ExitCode::SUCCESS
        }
        Err(err) => {
            step_io::error(&format!(
                "❌ Failed to track {}: {err:#}",
                cli.event_label()
            ));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<EventReceipt> {
    let inputs = ActionInputs::from_env(cli.raw_inputs()).context("Invalid action inputs")?;
    debug!(inputs = ?inputs, "Resolved inputs");

    let context = PipelineContext::from_env();
    let transport = HttpTransport::with_timeout(Duration::from_secs(cli.timeout_secs))
        .context("Failed to create HTTP client")?;
    let tracker = Tracker::new(transport, StepIo::from_env()).with_timeout_secs(cli.timeout_secs);

    let receipt = tracker.run(&inputs, &context).await?;
    Ok(receipt)
}
