//! API Module
//!
//! HTTP ingress of the relay: a health check and the GitLab webhook.

pub mod error;
pub mod health;
pub mod webhook;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::service::Relay;

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
    /// Expected `X-Gitlab-Token` value, if any
    pub webhook_secret: Option<String>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // GitLab webhooks
        .route("/webhook/gitlab", post(webhook::gitlab_webhook))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
