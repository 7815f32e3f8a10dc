use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Kind of event reported to Versioner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Build,
    #[default]
    Deployment,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Build => "build",
            EventKind::Deployment => "deployment",
        }
    }

    /// Capitalised noun used in headings ("Build", "Deployment").
    pub fn title(&self) -> &'static str {
        match self {
            EventKind::Build => "Build",
            EventKind::Deployment => "Deployment",
        }
    }

    /// Path segment of the collection endpoint, including the trailing slash.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            EventKind::Build => "build-events/",
            EventKind::Deployment => "deployment-events/",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "build" => Ok(EventKind::Build),
            "deployment" => Ok(EventKind::Deployment),
            other => Err(InputError::InvalidEventType(other.to_string())),
        }
    }
}
