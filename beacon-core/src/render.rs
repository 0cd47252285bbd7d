//! Status message rendering
//!
//! Turns a pipeline into the chat message body and its summary title.
//! Rendering is pure: the timestamp is supplied by the caller.

use chrono::NaiveDateTime;

use crate::domain::job::Job;
use crate::domain::pipeline::Pipeline;
use crate::domain::status::Status;

const TIMESTAMP_FORMAT: &str = "%H:%M - %d/%m/%Y";

/// Icon shown in front of a job line
pub fn status_icon(status: &Status) -> &'static str {
    match status {
        Status::Success => "🟢",
        Status::Failed => "🔴",
        Status::Canceled | Status::Skipped => "⚪️",
        Status::Running => "🔵️",
        _ => "🟡",
    }
}

/// Renders the message body for a pipeline at the given wall-clock time
pub fn render(pipeline: &Pipeline, now: NaiveDateTime) -> String {
    let mut message = format!(
        "*[{}] DEPLOYMENT*\n\n",
        pipeline.status.as_str().to_uppercase()
    );

    message.push_str(&format!(
        "[{}]\n{} triggered deployment in [{}](<{}>)\n\n",
        now.format(TIMESTAMP_FORMAT),
        pipeline.author,
        pipeline.project_name,
        pipeline.project_url
    ));

    message.push_str("Stages:\n```text\n");
    message.push_str(&render_stages(&pipeline.jobs));
    message.push_str("\n```\n");

    if !pipeline.finished && pipeline.status != Status::Success {
        message.push_str("```shell\n-------- BUILD LOG --------\n");
        message.push_str(&pipeline.log_string);
        message.push_str("\n--------------------------```");
    }

    message
}

/// Summary title shown alongside the message body
pub fn render_title(pipeline: &Pipeline) -> String {
    format!("{} - {}", pipeline.title, pipeline.status)
}

/// One line per job, ascending by job id
fn render_stages(jobs: &[Job]) -> String {
    let mut sorted: Vec<&Job> = jobs.iter().collect();
    sorted.sort_by_key(|job| job.id);

    sorted
        .iter()
        .map(|job| format!("{} {}: {}", status_icon(&job.status), job.stage, job.name))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{JobSnapshot, PipelineEvent, ProjectRef};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap()
    }

    fn pipeline(status: &str, jobs: &[(u64, &str)]) -> Pipeline {
        Pipeline::from_event(&PipelineEvent {
            pipeline_id: 42,
            pipeline_url: None,
            project: ProjectRef {
                id: 7,
                name: "web".to_string(),
                url: "https://gitlab.example.com/team/web".to_string(),
            },
            author: "Ada".to_string(),
            status: Status::from(status),
            jobs: jobs
                .iter()
                .map(|(id, status)| JobSnapshot {
                    id: *id,
                    stage: format!("stage{}", id),
                    name: format!("job{}", id),
                    status: Status::from(*status),
                    duration: None,
                })
                .collect(),
        })
    }

    #[test]
    fn test_icon_table() {
        assert_eq!(status_icon(&Status::Success), "🟢");
        assert_eq!(status_icon(&Status::Failed), "🔴");
        assert_eq!(status_icon(&Status::Canceled), "⚪️");
        assert_eq!(status_icon(&Status::Skipped), "⚪️");
        assert!(status_icon(&Status::Running).starts_with('🔵'));
        assert_eq!(status_icon(&Status::Pending), "🟡");
        assert_eq!(status_icon(&Status::Created), "🟡");
        assert_eq!(status_icon(&Status::Manual), "🟡");
        assert_eq!(status_icon(&Status::from("SUCCESS")), "🟡");
    }

    #[test]
    fn test_running_pipeline_render() {
        let pipeline = pipeline("running", &[(2, "pending"), (1, "running")]);
        let body = render(&pipeline, at());

        assert!(body.starts_with("*[RUNNING] DEPLOYMENT*\n\n"));
        assert!(body.contains("[14:05 - 09/03/2024]\n"));
        assert!(body.contains(
            "Ada triggered deployment in [web](<https://gitlab.example.com/team/web>)"
        ));

        let running = body.find("🔵️ stage1: job1").unwrap();
        let pending = body.find("🟡 stage2: job2").unwrap();
        assert!(running < pending);

        assert!(body.contains("-------- BUILD LOG --------\nWaiting for outputs...\n"));
    }

    #[test]
    fn test_successful_pipeline_omits_build_log() {
        let pipeline = pipeline("success", &[(1, "success"), (2, "success")]);
        let body = render(&pipeline, at());

        assert!(body.contains("[SUCCESS] DEPLOYMENT"));
        assert!(!body.contains("BUILD LOG"));
    }

    #[test]
    fn test_finished_pipeline_omits_build_log() {
        let mut pipeline = pipeline("failed", &[(1, "failed")]);
        assert!(render(&pipeline, at()).contains("BUILD LOG"));

        pipeline.finished = true;
        let body = render(&pipeline, at());
        assert!(body.contains("🔴 stage1: job1"));
        assert!(!body.contains("BUILD LOG"));
    }

    #[test]
    fn test_log_string_is_rendered_verbatim() {
        let mut pipeline = pipeline("running", &[(1, "running")]);
        pipeline.log_string = "$ cargo build\n```weird``` <b>".to_string();

        let body = render(&pipeline, at());
        assert!(body.contains("BUILD LOG --------\n$ cargo build\n```weird``` <b>\n---"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let pipeline = pipeline("running", &[(3, "skipped"), (1, "running"), (2, "canceled")]);
        assert_eq!(render(&pipeline, at()), render(&pipeline.clone(), at()));
    }

    #[test]
    fn test_title() {
        let pipeline = pipeline("failed", &[(1, "failed")]);
        assert_eq!(render_title(&pipeline), "Deployment #42 - failed");
    }
}
