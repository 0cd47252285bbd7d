//! Health Check API Handler
//!
//! Liveness endpoint, also reporting how many pipelines are being relayed.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::api::AppState;

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let tracked = state.relay.registry().len().await;
    Json(json!({ "status": "ok", "tracked_pipelines": tracked }))
}
