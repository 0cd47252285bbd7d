//! Pipeline and job status

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status reported by the CI backend for a pipeline or a job
///
/// Well-known values get their own variant; anything else is carried verbatim
/// so it can still be displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    Created,
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
    Skipped,
    Manual,
    Other(String),
}

impl Status {
    pub fn as_str(&self) -> &str {
        match self {
            Status::Created => "created",
            Status::Pending => "pending",
            Status::Running => "running",
            Status::Success => "success",
            Status::Failed => "failed",
            Status::Canceled => "canceled",
            Status::Skipped => "skipped",
            Status::Manual => "manual",
            Status::Other(value) => value.as_str(),
        }
    }

    /// Whether a job in this status still holds the pipeline open
    pub fn is_active(&self) -> bool {
        matches!(self, Status::Pending | Status::Running)
    }
}

impl From<&str> for Status {
    fn from(value: &str) -> Self {
        match value {
            "created" => Status::Created,
            "pending" => Status::Pending,
            "running" => Status::Running,
            "success" => Status::Success,
            "failed" => Status::Failed,
            "canceled" => Status::Canceled,
            "skipped" => Status::Skipped,
            "manual" => Status::Manual,
            other => Status::Other(other.to_string()),
        }
    }
}

impl From<String> for Status {
    fn from(value: String) -> Self {
        Status::from(value.as_str())
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
