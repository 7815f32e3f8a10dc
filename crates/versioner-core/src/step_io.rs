//! GitHub Actions step I/O: output and summary files, workflow commands.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum StepIoError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Paths of the runner-provided output and summary files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepIo {
    output_path: Option<PathBuf>,
    summary_path: Option<PathBuf>,
}

impl StepIo {
    pub fn new(output_path: Option<PathBuf>, summary_path: Option<PathBuf>) -> Self {
        Self {
            output_path,
            summary_path,
        }
    }

    /// Read `GITHUB_OUTPUT` and `GITHUB_STEP_SUMMARY`.
    pub fn from_env() -> Self {
        let path = |key: &str| {
            std::env::var_os(key)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        Self::new(path("GITHUB_OUTPUT"), path("GITHUB_STEP_SUMMARY"))
    }

    /// Detached from the runner; every write is skipped.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn set_outputs(&self, outputs: &[(&str, String)]) -> Result<(), StepIoError> {
        let Some(path) = &self.output_path else {
            debug!(count = outputs.len(), "GITHUB_OUTPUT not set; skipping step outputs");
            return Ok(());
        };
        let contents: String = outputs
            .iter()
            .map(|(name, value)| format_output(name, value))
            .collect();
        append(path, &contents)
    }

    pub fn append_summary(&self, markdown: &str) -> Result<(), StepIoError> {
        let Some(path) = &self.summary_path else {
            debug!("GITHUB_STEP_SUMMARY not set; skipping step summary");
            return Ok(());
        };
        let mut contents = markdown.to_string();
        if !contents.ends_with('\n') {
            contents.push('\n');
        }
        append(path, &contents)
    }
}

fn append(path: &Path, contents: &str) -> Result<(), StepIoError> {
    let to_error = |source| StepIoError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_error)?;
    file.write_all(contents.as_bytes()).map_err(to_error)
}

/// One entry for the `GITHUB_OUTPUT` file. Multi-line values use the
/// heredoc form with a random delimiter.
pub fn format_output(name: &str, value: &str) -> String {
    if !value.contains('\n') && !value.contains('\r') {
        return format!("{name}={value}\n");
    }
    let mut delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    while value.contains(&delimiter) {
        delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
    }
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Escape a message for a `::command::` line.
pub fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

pub fn notice(message: &str) {
    println!("::notice::{}", escape_data(message));
}

pub fn warning(message: &str) {
    println!("::warning::{}", escape_data(message));
}

pub fn error(message: &str) {
    println!("::error::{}", escape_data(message));
}
