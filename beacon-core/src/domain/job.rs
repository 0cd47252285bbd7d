//! Job domain types

use serde::{Deserialize, Serialize};

use crate::domain::status::Status;

/// One CI job inside a tracked pipeline
///
/// Identity fields never change after the job is first reported; only
/// `status` and `duration` follow later events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub pipeline_id: u64,
    pub name: String,
    pub stage: String,
    pub status: Status,
    /// Seconds, as reported by the CI backend (absent while queued)
    pub duration: Option<f64>,
}

impl Job {
    /// Overwrites the mutable fields from a newer report
    pub fn update(&mut self, status: Status, duration: Option<f64>) {
        self.status = status;
        self.duration = duration;
    }
}
