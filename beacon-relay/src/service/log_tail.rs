//! Log tail provider
//!
//! Source of the live log lines shown in a running pipeline's message.

use anyhow::{Context, Result};
use async_trait::async_trait;
use beacon_client::GitLabClient;

/// Service trait for fetching the end of a job's live log
#[async_trait]
pub trait LogTailProvider: Send + Sync {
    /// Returns the last `max_lines` lines of a job's log as one string
    async fn fetch_log_tail(
        &self,
        project_id: u64,
        pipeline_id: u64,
        job_id: u64,
        max_lines: usize,
    ) -> Result<String>;
}

#[async_trait]
impl LogTailProvider for GitLabClient {
    async fn fetch_log_tail(
        &self,
        project_id: u64,
        pipeline_id: u64,
        job_id: u64,
        max_lines: usize,
    ) -> Result<String> {
        self.job_log_tail(project_id, job_id, max_lines)
            .await
            .with_context(|| {
                format!(
                    "Failed to fetch log of job {} (pipeline {})",
                    job_id, pipeline_id
                )
            })
    }
}
