//! Beacon HTTP Clients
//!
//! Small, typed HTTP clients for the two backends the relay talks to:
//! - [`GitLabClient`] reads live job traces from the CI backend
//! - [`DiscordClient`] posts, edits and archives status threads in chat
//!
//! # Example
//!
//! ```no_run
//! use beacon_client::{DiscordClient, GitLabClient};
//!
//! # async fn example() -> beacon_client::Result<()> {
//! let gitlab = GitLabClient::new("https://gitlab.example.com", "glpat-token");
//! let tail = gitlab.job_log_tail(7, 380, 10).await?;
//!
//! let discord = DiscordClient::new("https://discord.com/api/v10", "bot-token");
//! let message = discord.create_message("1200", &tail).await?;
//! println!("Posted message {}", message.id);
//! # Ok(())
//! # }
//! ```

pub mod discord;
pub mod error;
pub mod gitlab;

// Re-export commonly used types
pub use discord::{DiscordChannel, DiscordClient, DiscordMessage};
pub use error::{ClientError, Result};
pub use gitlab::GitLabClient;

use serde::de::DeserializeOwned;

// =============================================================================
// Response Handlers
// =============================================================================

/// Check the status code and deserialize a JSON body
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let response = check_status(response).await?;

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Check the status code and return the raw text body
async fn handle_text_response(response: reqwest::Response) -> Result<String> {
    let response = check_status(response).await?;

    response.text().await.map_err(ClientError::RequestFailed)
}

/// Turn a non-2xx response into an [`ClientError::ApiError`]
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    Ok(response)
}

/// Normalize a base URL so paths can be appended with a single `/`
fn normalize_base(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}
