//! GitLab API client
//!
//! Only the job trace endpoint is needed: the relay shows the last few lines
//! of the running job's log inside the status message.

use regex::Regex;
use reqwest::Client;
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::error::Result;
use crate::{handle_text_response, normalize_base};

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// HTTP client for the GitLab REST API (v4)
#[derive(Debug, Clone)]
pub struct GitLabClient {
    /// Base URL of the GitLab instance (e.g., "https://gitlab.example.com")
    base_url: String,
    /// Personal or project access token, sent as `PRIVATE-TOKEN`
    token: String,
    client: Client,
}

impl GitLabClient {
    /// Create a new GitLab client
    ///
    /// An empty token sends unauthenticated requests (public projects only).
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new GitLab client with a custom HTTP client
    ///
    /// Use this to configure timeouts; trace downloads of long jobs can be slow.
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            base_url: normalize_base(base_url),
            token: token.into(),
            client,
        }
    }

    /// Get the base URL of the GitLab instance
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Download the full raw trace of a job
    pub async fn job_trace(&self, project_id: u64, job_id: u64) -> Result<String> {
        let url = format!(
            "{}/api/v4/projects/{}/jobs/{}/trace",
            self.base_url, project_id, job_id
        );

        let mut request = self.client.get(&url);
        if !self.token.is_empty() {
            request = request.header(TOKEN_HEADER, &self.token);
        }

        tracing::debug!("Fetching trace of job {} in project {}", job_id, project_id);
        let response = request.send().await?;

        handle_text_response(response).await
    }

    /// Fetch the last `max_lines` printable lines of a job's trace
    pub async fn job_log_tail(
        &self,
        project_id: u64,
        job_id: u64,
        max_lines: usize,
    ) -> Result<String> {
        let trace = self.job_trace(project_id, job_id).await?;
        Ok(tail_lines(&trace, max_lines))
    }
}

/// Keep the last `max_lines` non-empty lines of a raw trace
///
/// Terminal control sequences are removed and carriage-return overwrites
/// are resolved to the final visible text, which also drops GitLab's
/// `section_start`/`section_end` markers.
pub fn tail_lines(trace: &str, max_lines: usize) -> String {
    let lines: Vec<String> = trace
        .lines()
        .map(|line| strip_ansi(visible_segment(line)).into_owned())
        .filter(|line| !line.trim().is_empty())
        .collect();

    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

/// Text after the last carriage return that still has content
fn visible_segment(line: &str) -> &str {
    line.rsplit('\r')
        .find(|segment| {
            let text = strip_ansi(segment);
            !text.trim().is_empty() && !is_section_marker(&text)
        })
        .unwrap_or("")
}

fn is_section_marker(text: &str) -> bool {
    text.starts_with("section_start:") || text.starts_with("section_end:")
}

/// CSI escape sequences (colours, cursor moves, line erase)
static CSI_SEQUENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-?]*[ -/]*[@-~]").expect("valid CSI pattern"));

fn strip_ansi(input: &str) -> Cow<'_, str> {
    CSI_SEQUENCE.replace_all(input, "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = GitLabClient::new("https://gitlab.example.com/", "token");
        assert_eq!(client.base_url(), "https://gitlab.example.com");
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        let trace = "one\ntwo\nthree\nfour\n";
        assert_eq!(tail_lines(trace, 2), "three\nfour");
        assert_eq!(tail_lines(trace, 10), "one\ntwo\nthree\nfour");
        assert_eq!(tail_lines(trace, 0), "");
    }

    #[test]
    fn test_tail_strips_control_sequences() {
        let trace = "section_start:1700000000:step_script\r\x1b[0K\x1b[0;m$ cargo build\x1b[0;m\n\
                     \x1b[32;1m   Compiling beacon v0.1.0\x1b[0;m\n\
                     \n\
                     section_end:1700000010:step_script\r\x1b[0K\n";

        assert_eq!(tail_lines(trace, 10), "$ cargo build\n   Compiling beacon v0.1.0");
    }

    #[test]
    fn test_strip_ansi_removes_csi_sequences() {
        assert_eq!(strip_ansi("\x1b[31;1mERROR\x1b[0m: failed"), "ERROR: failed");
        assert_eq!(strip_ansi("\x1b[?25lhidden cursor\x1b[2K"), "hidden cursor");
        assert_eq!(strip_ansi("plain text"), "plain text");
    }

    #[test]
    fn test_tail_resolves_carriage_return_progress() {
        let trace = "Downloading 10%\rDownloading 55%\rDownloading 100%\ndone";
        assert_eq!(tail_lines(trace, 5), "Downloading 100%\ndone");
    }

    #[tokio::test]
    async fn test_job_log_tail_fetches_trace() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/v4/projects/7/jobs/380/trace")
                .header("PRIVATE-TOKEN", "glpat-test");
            then.status(200).body("a\nb\nc\nd\n");
        });

        let client = GitLabClient::new(server.base_url(), "glpat-test");
        let tail = client.job_log_tail(7, 380, 3).await.unwrap();

        mock.assert();
        assert_eq!(tail, "b\nc\nd");
    }

    #[tokio::test]
    async fn test_job_trace_maps_error_status() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/api/v4/projects/7/jobs/1/trace");
            then.status(404).body("{\"message\":\"404 Not found\"}");
        });

        let client = GitLabClient::new(server.base_url(), "");
        let err = client.job_trace(7, 1).await.unwrap_err();

        assert!(err.is_not_found());
    }
}
