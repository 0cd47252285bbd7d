//! Pipeline log watcher
//!
//! One watcher runs per tracked pipeline. Every interval it tails the log of
//! the oldest running job, stores it on the pipeline and re-publishes the
//! status message. It stops on its own once the pipeline is finished or
//! evicted, or (with the `stop` idle policy) when no job is running.

use tracing::{debug, info, warn};

use crate::config::IdlePolicy;
use crate::service::{LogTailProvider, Relay};

/// Watcher loop state, evaluated after every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Sleep one interval, then tick again
    Armed,
    Stopped,
}

/// Background log tailer for a single pipeline
pub struct Watcher {
    relay: Relay,
    pipeline_id: u64,
}

impl Watcher {
    pub fn new(relay: Relay, pipeline_id: u64) -> Self {
        Self { relay, pipeline_id }
    }

    /// Runs the loop on its own task
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Ticks every interval until the watcher stops
    pub async fn run(self) {
        let interval = self.relay.watch_config().interval;
        info!(
            "Watching pipeline {} (interval: {:?})",
            self.pipeline_id, interval
        );

        let mut state = WatchState::Armed;
        while state == WatchState::Armed {
            tokio::time::sleep(interval).await;
            state = self.tick().await;
        }

        debug!("Watcher for pipeline {} stopped", self.pipeline_id);
    }

    /// Performs a single watch cycle
    pub async fn tick(&self) -> WatchState {
        let Some(cell) = self.relay.registry().get(self.pipeline_id).await else {
            debug!("Pipeline {} is no longer tracked", self.pipeline_id);
            return WatchState::Stopped;
        };

        let watch = self.relay.watch_config();
        let (project_id, job_id) = {
            let pipeline = cell.lock().await;
            if pipeline.finished {
                return WatchState::Stopped;
            }

            match pipeline.watch_candidate() {
                Some(job) => (pipeline.project_id, job.id),
                None => {
                    return match watch.idle_policy {
                        IdlePolicy::Stop => {
                            debug!(
                                "No running job in pipeline {}, stopping watcher",
                                self.pipeline_id
                            );
                            WatchState::Stopped
                        }
                        IdlePolicy::Continue => WatchState::Armed,
                    };
                }
            }
        };

        match self
            .relay
            .logs()
            .fetch_log_tail(project_id, self.pipeline_id, job_id, watch.log_lines)
            .await
        {
            Ok(tail) => {
                let mut pipeline = cell.lock().await;
                if pipeline.finished {
                    return WatchState::Stopped;
                }
                pipeline.log_string = tail;
                self.relay.publish(&pipeline).await;
            }
            Err(e) => warn!("Watch cycle of pipeline {} failed: {:#}", self.pipeline_id, e),
        }

        if cell.lock().await.finished {
            WatchState::Stopped
        } else {
            WatchState::Armed
        }
    }
}
