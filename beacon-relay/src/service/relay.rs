//! Relay service
//!
//! Sequences the side effects of every inbound event:
//! - first sight of a pipeline: open a thread, post the status message and
//!   start a watcher
//! - any later event: re-render and edit the message
//! - pipeline settled: final edit, close the message and evict the pipeline
//!
//! Chat failures are logged and never stop pipeline state from advancing;
//! the next update naturally catches the message up.

use beacon_core::domain::event::{JobEvent, PipelineEvent};
use beacon_core::domain::pipeline::Pipeline;
use beacon_core::render::{render, render_title};
use chrono::Local;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::WatchConfig;
use crate::registry::Registry;
use crate::scheduler::Watcher;
use crate::service::{LogTailProvider, NotificationChannel, ProjectBindings};

/// Entry point for pipeline and job events
#[derive(Clone)]
pub struct Relay {
    registry: Arc<Registry>,
    notifier: Arc<dyn NotificationChannel>,
    logs: Arc<dyn LogTailProvider>,
    bindings: Arc<dyn ProjectBindings>,
    watch: WatchConfig,
}

impl Relay {
    pub fn new(
        registry: Arc<Registry>,
        notifier: Arc<dyn NotificationChannel>,
        logs: Arc<dyn LogTailProvider>,
        bindings: Arc<dyn ProjectBindings>,
        watch: WatchConfig,
    ) -> Self {
        Self {
            registry,
            notifier,
            logs,
            bindings,
            watch,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn logs(&self) -> &Arc<dyn LogTailProvider> {
        &self.logs
    }

    pub fn watch_config(&self) -> &WatchConfig {
        &self.watch
    }

    /// Handles a pipeline-level event
    pub async fn handle_pipeline_event(&self, event: PipelineEvent) {
        let (mut pipeline, is_new) = self.registry.upsert_from_pipeline_event(&event).await;

        if is_new {
            info!(
                "Tracking pipeline {} of {} ({})",
                pipeline.id, pipeline.project_name, pipeline.status
            );
            self.announce(&event, &mut pipeline).await;
            drop(pipeline);
            self.spawn_watcher(event.pipeline_id);
            return;
        }

        debug!("Pipeline {} is now {}", pipeline.id, pipeline.status);
        self.publish(&pipeline).await;

        if pipeline.finished {
            self.finalize(&mut pipeline).await;
        }
    }

    /// Handles a job-level event; unknown pipelines are ignored
    pub async fn handle_job_event(&self, event: JobEvent) {
        match self.registry.apply_job_event(&event).await {
            Some(pipeline) => {
                debug!(
                    "Job {} of pipeline {} is now {}",
                    event.job_id, event.pipeline_id, event.status
                );
                self.publish(&pipeline).await;
            }
            None => debug!(
                "Ignoring job {} for untracked pipeline {}",
                event.job_id, event.pipeline_id
            ),
        }
    }

    /// Starts the log watcher of a pipeline
    pub fn spawn_watcher(&self, pipeline_id: u64) -> JoinHandle<()> {
        Watcher::new(self.clone(), pipeline_id).spawn()
    }

    /// Re-renders a pipeline into every message tied to it
    ///
    /// Callers hold the pipeline's lock for the duration, so edits of one
    /// pipeline are applied in order and none follows its close.
    pub async fn publish(&self, pipeline: &Pipeline) {
        if pipeline.messages.is_empty() {
            return;
        }

        let body = render(pipeline, Local::now().naive_local());
        let title = render_title(pipeline);

        for handle in &pipeline.messages {
            if let Err(e) = self.notifier.edit_message(handle, &body, &title).await {
                warn!("Failed to update message of pipeline {}: {:#}", pipeline.id, e);
            }
        }
    }

    /// Opens the thread and posts the first status message of a new pipeline
    async fn announce(&self, event: &PipelineEvent, pipeline: &mut Pipeline) {
        let Some(channel_id) = self.bindings.channel_for(pipeline.project_id).await else {
            warn!(
                "No channel bound to project {}, pipeline {} is tracked without a message",
                pipeline.project_id, pipeline.id
            );
            return;
        };

        let intro = match &event.pipeline_url {
            Some(url) => format!("Deployment [#{}](<{}>)", pipeline.id, url),
            None => format!("Deployment #{}", pipeline.id),
        };

        let thread_id = match self
            .notifier
            .open_thread(&channel_id, &pipeline.title, &intro)
            .await
        {
            Ok(thread_id) => thread_id,
            Err(e) => {
                error!("Failed to open thread for pipeline {}: {:#}", pipeline.id, e);
                return;
            }
        };

        let body = render(pipeline, Local::now().naive_local());
        match self
            .notifier
            .send_message(&channel_id, &thread_id, &body)
            .await
        {
            Ok(handle) => pipeline.messages.push(handle),
            Err(e) => error!("Failed to send message for pipeline {}: {:#}", pipeline.id, e),
        }
    }

    /// Closes the messages of a finished pipeline and stops tracking it
    ///
    /// The messages are detached first; anyone still waiting on the pipeline's
    /// lock finds nothing left to edit.
    async fn finalize(&self, pipeline: &mut Pipeline) {
        for handle in std::mem::take(&mut pipeline.messages) {
            if let Err(e) = self.notifier.close_message(&handle).await {
                warn!("Failed to close message of pipeline {}: {:#}", pipeline.id, e);
            }
        }

        self.registry.remove(pipeline.id).await;
        info!(
            "Pipeline {} finished with status {} ({} still tracked)",
            pipeline.id,
            pipeline.status,
            self.registry.len().await
        );
    }
}
