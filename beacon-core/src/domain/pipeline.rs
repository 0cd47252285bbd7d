//! Pipeline domain types and the event reducer

use serde::{Deserialize, Serialize};

use crate::domain::event::{JobEvent, PipelineEvent};
use crate::domain::job::Job;
use crate::domain::message::MessageHandle;
use crate::domain::status::Status;

/// Log placeholder shown until the watcher fetched real output
pub const LOG_PLACEHOLDER: &str = "Waiting for outputs...";

/// Tracked CI pipeline
///
/// Project fields and the author are fixed at creation. `status`, the jobs'
/// progress and `log_string` follow events and watcher ticks. `finished`
/// only ever moves from false to true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub project_id: u64,
    pub project_name: String,
    pub project_url: String,
    pub author: String,
    pub status: Status,
    pub jobs: Vec<Job>,
    pub messages: Vec<MessageHandle>,
    /// Last fetched log tail of the running job, replaced on every fetch
    pub log_string: String,
    pub finished: bool,
    pub title: String,
}

impl Pipeline {
    /// Builds a freshly tracked pipeline from its first pipeline-level event
    pub fn from_event(event: &PipelineEvent) -> Self {
        let jobs = event
            .jobs
            .iter()
            .map(|job| Job {
                id: job.id,
                pipeline_id: event.pipeline_id,
                name: job.name.clone(),
                stage: job.stage.clone(),
                status: job.status.clone(),
                duration: job.duration,
            })
            .collect();

        Self {
            id: event.pipeline_id,
            project_id: event.project.id,
            project_name: event.project.name.clone(),
            project_url: event.project.url.clone(),
            author: event.author.clone(),
            status: event.status.clone(),
            jobs,
            messages: Vec::new(),
            log_string: LOG_PLACEHOLDER.to_string(),
            finished: false,
            title: thread_title(event.pipeline_id),
        }
    }

    /// Merges a later pipeline-level event into this pipeline
    ///
    /// Jobs are matched by id: matched jobs take the new status and duration,
    /// jobs missing from the snapshot are left alone and jobs that only appear
    /// in the snapshot are not added. Afterwards the pipeline is marked
    /// finished once no job is pending or running.
    pub fn merge(&mut self, event: &PipelineEvent) {
        self.status = event.status.clone();

        for job in &mut self.jobs {
            if let Some(update) = event.jobs.iter().find(|candidate| candidate.id == job.id) {
                job.update(update.status.clone(), update.duration);
            }
        }

        if self.is_settled() {
            self.finished = true;
        }
    }

    /// Applies a job-level event; returns whether a job matched
    ///
    /// Never touches `finished`.
    pub fn apply_job_update(&mut self, event: &JobEvent) -> bool {
        match self.jobs.iter_mut().find(|job| job.id == event.job_id) {
            Some(job) => {
                job.update(event.status.clone(), event.duration);
                true
            }
            None => false,
        }
    }

    /// True when no job is pending or running
    pub fn is_settled(&self) -> bool {
        !self.jobs.iter().any(|job| job.status.is_active())
    }

    /// The job the watcher should tail: the running job with the lowest id
    pub fn watch_candidate(&self) -> Option<&Job> {
        self.jobs
            .iter()
            .filter(|job| job.status == Status::Running)
            .min_by_key(|job| job.id)
    }
}

/// Title of the chat thread opened for a pipeline
pub fn thread_title(pipeline_id: u64) -> String {
    format!("Deployment #{}", pipeline_id)
}
