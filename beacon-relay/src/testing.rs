//! Test doubles for the relay's collaborators

use anyhow::Result;
use async_trait::async_trait;
use beacon_core::domain::event::{JobSnapshot, PipelineEvent, ProjectRef};
use beacon_core::domain::message::MessageHandle;
use beacon_core::domain::status::Status;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::WatchConfig;
use crate::registry::Registry;
use crate::service::{LogTailProvider, NotificationChannel, Relay, StaticProjectBindings};

/// Project 7 is bound to channel 1200
pub const PROJECT_ID: u64 = 7;
pub const CHANNEL_ID: &str = "1200";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Open {
        channel_id: String,
        title: String,
        body: String,
    },
    Send {
        thread_id: String,
        body: String,
    },
    Edit {
        handle: MessageHandle,
        body: String,
        title: String,
    },
    Close {
        handle: MessageHandle,
    },
}

/// Notification channel recording every call
///
/// Calls are recorded when they complete, so slowed calls show up in the
/// order the chat backend would apply them.
#[derive(Default)]
pub struct RecordingChannel {
    calls: Mutex<Vec<Call>>,
    fail_edits: bool,
    open_delay: Duration,
    edit_delay: Duration,
}

impl RecordingChannel {
    pub fn failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::default()
        }
    }

    pub fn with_slow_opens(delay: Duration) -> Self {
        Self {
            open_delay: delay,
            ..Self::default()
        }
    }

    pub fn with_slow_edits(delay: Duration) -> Self {
        Self {
            edit_delay: delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl NotificationChannel for RecordingChannel {
    async fn open_thread(&self, channel_id: &str, title: &str, body: &str) -> Result<String> {
        tokio::time::sleep(self.open_delay).await;
        self.record(Call::Open {
            channel_id: channel_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(format!("thread-{}", title))
    }

    async fn send_message(
        &self,
        channel_id: &str,
        thread_id: &str,
        body: &str,
    ) -> Result<MessageHandle> {
        self.record(Call::Send {
            thread_id: thread_id.to_string(),
            body: body.to_string(),
        });
        Ok(MessageHandle {
            channel_id: channel_id.to_string(),
            thread_id: thread_id.to_string(),
            message_id: "msg-1".to_string(),
        })
    }

    async fn edit_message(&self, handle: &MessageHandle, body: &str, title: &str) -> Result<()> {
        tokio::time::sleep(self.edit_delay).await;
        self.record(Call::Edit {
            handle: handle.clone(),
            body: body.to_string(),
            title: title.to_string(),
        });
        if self.fail_edits {
            anyhow::bail!("chat backend unavailable");
        }
        Ok(())
    }

    async fn close_message(&self, handle: &MessageHandle) -> Result<()> {
        self.record(Call::Close {
            handle: handle.clone(),
        });
        Ok(())
    }
}

/// Log provider returning a fixed tail
pub struct FakeLogs {
    tail: String,
    fail: AtomicBool,
    requests: Mutex<Vec<(u64, u64, u64, usize)>>,
}

impl FakeLogs {
    pub fn new(tail: &str) -> Self {
        Self {
            tail: tail.to_string(),
            fail: AtomicBool::new(false),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        let logs = Self::new("");
        logs.fail.store(true, Ordering::SeqCst);
        logs
    }

    /// (project, pipeline, job, lines) of every fetch
    pub fn requests(&self) -> Vec<(u64, u64, u64, usize)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogTailProvider for FakeLogs {
    async fn fetch_log_tail(
        &self,
        project_id: u64,
        pipeline_id: u64,
        job_id: u64,
        max_lines: usize,
    ) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((project_id, pipeline_id, job_id, max_lines));

        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("trace request timed out");
        }
        Ok(self.tail.clone())
    }
}

pub fn relay_with(
    channel: Arc<RecordingChannel>,
    logs: Arc<FakeLogs>,
    watch: WatchConfig,
) -> Relay {
    let bindings = StaticProjectBindings::new(HashMap::from([(
        PROJECT_ID,
        CHANNEL_ID.to_string(),
    )]));

    Relay::new(
        Arc::new(Registry::new()),
        channel,
        logs,
        Arc::new(bindings),
        watch,
    )
}

/// Pipeline event for project 7 with jobs in stage "build" named `job-<id>`
pub fn pipeline_event(pipeline_id: u64, status: &str, jobs: &[(u64, &str)]) -> PipelineEvent {
    PipelineEvent {
        pipeline_id,
        pipeline_url: None,
        project: ProjectRef {
            id: PROJECT_ID,
            name: "web".to_string(),
            url: "https://gitlab.example.com/team/web".to_string(),
        },
        author: "Ada".to_string(),
        status: Status::from(status),
        jobs: jobs
            .iter()
            .map(|(id, status)| JobSnapshot {
                id: *id,
                stage: "build".to_string(),
                name: format!("job-{}", id),
                status: Status::from(*status),
                duration: None,
            })
            .collect(),
    }
}
