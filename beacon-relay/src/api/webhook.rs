//! Webhook API Handlers
//!
//! Receives GitLab pipeline and job hooks, validates them and hands the
//! normalized events to the relay.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use beacon_core::domain::event::{JobEvent, PipelineEvent};
use beacon_core::dto::gitlab::{BUILD_KIND, JobHook, PIPELINE_KIND, PipelineHook};
use serde_json::{Value, json};

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

const TOKEN_HEADER: &str = "x-gitlab-token";

/// POST /webhook/gitlab
/// Dispatch a GitLab hook on its `object_kind`
pub async fn gitlab_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    verify_token(&headers, state.webhook_secret.as_deref())?;

    let kind = payload
        .get("object_kind")
        .and_then(Value::as_str)
        .ok_or_else(|| ApiError::BadRequest("Missing object_kind".to_string()))?
        .to_string();

    match kind.as_str() {
        PIPELINE_KIND => {
            let hook: PipelineHook = serde_json::from_value(payload)?;
            let event = PipelineEvent::from(hook);
            tracing::info!(
                "Pipeline hook: pipeline {} is {}",
                event.pipeline_id,
                event.status
            );
            state.relay.handle_pipeline_event(event).await;
        }
        BUILD_KIND => {
            let hook: JobHook = serde_json::from_value(payload)?;
            let event = JobEvent::from(hook);
            tracing::debug!(
                "Job hook: job {} of pipeline {} is {}",
                event.job_id,
                event.pipeline_id,
                event.status
            );
            state.relay.handle_job_event(event).await;
        }
        other => {
            tracing::debug!("Ignoring {} hook", other);
            return Ok((StatusCode::ACCEPTED, Json(json!({ "status": "ignored" }))));
        }
    }

    Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}

/// Checks `X-Gitlab-Token` against the configured secret
fn verify_token(headers: &HeaderMap, secret: Option<&str>) -> ApiResult<()> {
    let Some(secret) = secret else {
        return Ok(());
    };

    let provided = headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    if provided == Some(secret) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}
