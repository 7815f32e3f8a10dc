//! Tracing initialisation for the tracker binary.
//!
//! Call [`init_tracing`] once at program start. Later calls are ignored
//! because the global subscriber can only be set once per process.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// * `json` emits newline-delimited JSON instead of plain lines.
/// * `level` is the default verbosity when `RUST_LOG` is not set.
///
/// Plain output drops timestamps and targets: the runner log already
/// timestamps every line.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .without_time()
                    .with_level(false),
            )
            .try_init()
            .ok();
    }
}

/// Debug level when the runner has step debugging enabled.
pub fn runner_debug_enabled() -> bool {
    std::env::var("RUNNER_DEBUG").is_ok_and(|v| v == "1")
}
