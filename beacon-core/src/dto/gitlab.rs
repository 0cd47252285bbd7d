//! GitLab webhook payloads

use serde::{Deserialize, Serialize};

use crate::domain::event::{JobEvent, JobSnapshot, PipelineEvent, ProjectRef};
use crate::domain::status::Status;

/// `object_kind` of a pipeline hook
pub const PIPELINE_KIND: &str = "pipeline";
/// `object_kind` of a job hook
pub const BUILD_KIND: &str = "build";

/// Pipeline Hook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineHook {
    pub object_attributes: PipelineAttributes,
    pub user: HookUser,
    pub project: HookProject,
    #[serde(default)]
    pub builds: Vec<HookBuild>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineAttributes {
    pub id: u64,
    pub status: Status,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookUser {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookProject {
    pub id: u64,
    pub name: String,
    pub web_url: String,
}

/// Job entry inside a pipeline hook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookBuild {
    pub id: u64,
    pub stage: String,
    pub name: String,
    pub status: Status,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// Job Hook payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobHook {
    pub build_id: u64,
    pub build_status: Status,
    #[serde(default)]
    pub build_duration: Option<f64>,
    pub pipeline_id: u64,
}

impl From<PipelineHook> for PipelineEvent {
    fn from(hook: PipelineHook) -> Self {
        Self {
            pipeline_id: hook.object_attributes.id,
            pipeline_url: hook.object_attributes.url,
            project: ProjectRef {
                id: hook.project.id,
                name: hook.project.name,
                url: hook.project.web_url,
            },
            author: hook.user.name,
            status: hook.object_attributes.status,
            jobs: hook
                .builds
                .into_iter()
                .map(|build| JobSnapshot {
                    id: build.id,
                    stage: build.stage,
                    name: build.name,
                    status: build.status,
                    duration: build.duration,
                })
                .collect(),
        }
    }
}

impl From<JobHook> for JobEvent {
    fn from(hook: JobHook) -> Self {
        Self {
            pipeline_id: hook.pipeline_id,
            job_id: hook.build_id,
            status: hook.build_status,
            duration: hook.build_duration,
        }
    }
}
