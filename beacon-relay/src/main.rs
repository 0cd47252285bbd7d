//! Beacon Relay
//!
//! Relays GitLab pipeline events into a live Discord status thread.
//!
//! Architecture:
//! - Configuration: Load settings from environment or defaults
//! - API: GitLab webhook ingress (pipeline and job hooks)
//! - Registry: In-memory state of every in-flight pipeline
//! - Services: Event handling and the collaborators it talks to
//! - Scheduler: One log watcher per tracked pipeline
//!
//! Pipeline state lives only in memory and is lost on restart.

mod api;
mod config;
mod registry;
mod scheduler;
mod service;

#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use beacon_client::{DiscordClient, GitLabClient};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;
use crate::config::Config;
use crate::registry::Registry;
use crate::service::{DiscordNotifier, Relay, StaticProjectBindings};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beacon_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Beacon Relay...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    info!(
        "Loaded configuration: gitlab_url={}, {} project binding(s)",
        config.gitlab_url,
        config.project_bindings.len()
    );
    if config.webhook_secret.is_none() {
        tracing::warn!("GITLAB_WEBHOOK_SECRET is not set, webhook tokens are not checked");
    }

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let gitlab = GitLabClient::with_client(&config.gitlab_url, &config.gitlab_token, http.clone());
    let discord = DiscordClient::with_client(&config.discord_api_base, &config.discord_token, http);

    info!(
        "Reading traces from {}, posting to {}",
        gitlab.base_url(),
        discord.api_base()
    );

    let relay = Relay::new(
        Arc::new(Registry::new()),
        Arc::new(DiscordNotifier::new(discord)),
        Arc::new(gitlab),
        Arc::new(StaticProjectBindings::new(config.project_bindings.clone())),
        config.watch.clone(),
    );

    info!(
        "Watch interval: {:?}, log lines: {}, idle policy: {:?}",
        config.watch.interval, config.watch.log_lines, config.watch.idle_policy
    );

    // Build router with all API endpoints
    let app = api::create_router(AppState {
        relay,
        webhook_secret: config.webhook_secret.clone(),
    });

    info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Failed to start server")?;

    Ok(())
}
