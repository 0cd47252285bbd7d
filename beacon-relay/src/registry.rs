//! Pipeline registry
//!
//! In-memory map of every pipeline currently being relayed. Each pipeline sits
//! behind its own mutex so a slow chat call for one pipeline never blocks
//! events for another; the outer map lock is only held to look up, insert or
//! evict entries.
//!
//! Updates hand back the pipeline still locked. Callers keep the guard while
//! they talk to the chat backend, so edits of one pipeline never interleave.

use beacon_core::domain::event::{JobEvent, PipelineEvent};
use beacon_core::domain::pipeline::Pipeline;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Shared handle to one tracked pipeline
pub type PipelineCell = Arc<Mutex<Pipeline>>;

/// Exclusive access to one tracked pipeline
pub type PipelineGuard = OwnedMutexGuard<Pipeline>;

/// Registry of tracked pipelines, keyed by pipeline id
#[derive(Default)]
pub struct Registry {
    pipelines: RwLock<HashMap<u64, PipelineCell>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell of a tracked pipeline
    pub async fn get(&self, id: u64) -> Option<PipelineCell> {
        self.pipelines.read().await.get(&id).cloned()
    }

    /// Creates or merges a pipeline from a pipeline-level event
    ///
    /// Returns the locked pipeline and whether it was created by this call.
    /// Exactly one caller observes `true` per id.
    pub async fn upsert_from_pipeline_event(
        &self,
        event: &PipelineEvent,
    ) -> (PipelineGuard, bool) {
        let cell = {
            let mut pipelines = self.pipelines.write().await;
            match pipelines.get(&event.pipeline_id) {
                Some(cell) => Arc::clone(cell),
                None => {
                    let cell = Arc::new(Mutex::new(Pipeline::from_event(event)));
                    // Locked before it is visible, so the creator always goes first
                    let pipeline = Arc::clone(&cell).lock_owned().await;
                    pipelines.insert(event.pipeline_id, cell);
                    return (pipeline, true);
                }
            }
        };

        let mut pipeline = cell.lock_owned().await;
        pipeline.merge(event);
        (pipeline, false)
    }

    /// Applies a job-level event to a tracked pipeline
    ///
    /// Unknown pipelines are ignored and yield `None`.
    pub async fn apply_job_event(&self, event: &JobEvent) -> Option<PipelineGuard> {
        let cell = self.get(event.pipeline_id).await?;
        let mut pipeline = cell.lock_owned().await;

        if !pipeline.apply_job_update(event) {
            tracing::debug!(
                "Job {} is not part of pipeline {}, ignoring",
                event.job_id,
                event.pipeline_id
            );
        }

        Some(pipeline)
    }

    /// Evicts a pipeline; returns whether it was tracked
    pub async fn remove(&self, id: u64) -> bool {
        self.pipelines.write().await.remove(&id).is_some()
    }

    /// Number of tracked pipelines
    pub async fn len(&self) -> usize {
        self.pipelines.read().await.len()
    }
}

#[cfg(test)]
impl Registry {
    pub async fn is_empty(&self) -> bool {
        self.pipelines.read().await.is_empty()
    }
}
