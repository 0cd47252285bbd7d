//! Normalized CI events
//!
//! Webhook payloads are converted into these before they reach the reducer,
//! so everything here is assumed well-formed.

use serde::{Deserialize, Serialize};

use crate::domain::status::Status;

/// Project a pipeline belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: u64,
    pub name: String,
    pub url: String,
}

/// Job as listed in a pipeline-level snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: u64,
    pub stage: String,
    pub name: String,
    pub status: Status,
    pub duration: Option<f64>,
}

/// Pipeline-level event: the full pipeline status plus a snapshot of its jobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvent {
    pub pipeline_id: u64,
    /// Link to the pipeline page, used in the thread intro
    pub pipeline_url: Option<String>,
    pub project: ProjectRef,
    pub author: String,
    pub status: Status,
    pub jobs: Vec<JobSnapshot>,
}

/// Job-level event: progress of a single job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobEvent {
    pub pipeline_id: u64,
    pub job_id: u64,
    pub status: Status,
    pub duration: Option<f64>,
}
