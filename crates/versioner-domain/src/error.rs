//! Error types for event tracking

use thiserror::Error;

use crate::outcome::Rejection;

/// Validation failures for action inputs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("api_key is required (provide via input or VERSIONER_API_KEY environment variable)")]
    MissingApiKey,

    #[error("Invalid api_url: must start with http:// or https://")]
    InvalidApiUrl,

    #[error("version is required")]
    MissingVersion,

    #[error("Invalid event_type: '{0}'. Must be one of: build, deployment")]
    InvalidEventType(String),

    #[error("environment is required when event_type is 'deployment'")]
    MissingEnvironment,

    #[error("Invalid metadata JSON: {0}")]
    InvalidMetadata(String),

    #[error("Invalid metadata JSON: Metadata must be a JSON object")]
    MetadataNotObject,

    #[error("product_name is required when the repository cannot be detected")]
    MissingProductName,
}

/// Errors that fail the pipeline step.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// The remote policy refused the event. Never demoted by local flags.
    #[error("{0}")]
    Rejected(Box<Rejection>),

    /// Credential, validation, routing or transport failure.
    #[error("{0}")]
    Api(String),

    #[error(transparent)]
    InvalidInput(#[from] InputError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TrackerError {
    /// Whether this error came from a server-side policy rejection.
    pub fn is_rejection(&self) -> bool {
        matches!(self, TrackerError::Rejected(_))
    }
}

/// Result type for event tracking operations
pub type Result<T> = std::result::Result<T, TrackerError>;
