//! Discord REST client
//!
//! Covers the handful of endpoints a status thread needs: post a message,
//! start a thread from it, edit messages, and rename or archive the thread.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::Result;
use crate::{check_status, handle_response, normalize_base};

/// Message as returned by Discord (only the fields we use)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordMessage {
    pub id: String,
    pub channel_id: String,
}

/// Channel or thread as returned by Discord (only the fields we use)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// HTTP client for the Discord bot API
#[derive(Debug, Clone)]
pub struct DiscordClient {
    /// API base URL (e.g., "https://discord.com/api/v10")
    api_base: String,
    /// Bot token, sent as `Authorization: Bot <token>`
    token: String,
    client: Client,
}

impl DiscordClient {
    /// Create a new Discord client
    pub fn new(api_base: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(api_base, token, Client::new())
    }

    /// Create a new Discord client with a custom HTTP client
    pub fn with_client(
        api_base: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            api_base: normalize_base(api_base),
            token: token.into(),
            client,
        }
    }

    /// Get the API base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Post a message to a channel or thread
    pub async fn create_message(&self, channel_id: &str, content: &str) -> Result<DiscordMessage> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&json!({ "content": content }))
            .send()
            .await?;

        handle_response(response).await
    }

    /// Start a public thread anchored on an existing message
    pub async fn start_thread(
        &self,
        channel_id: &str,
        message_id: &str,
        name: &str,
    ) -> Result<DiscordChannel> {
        let url = format!(
            "{}/channels/{}/messages/{}/threads",
            self.api_base, channel_id, message_id
        );
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&json!({ "name": thread_name(name) }))
            .send()
            .await?;

        handle_response(response).await
    }

    /// Replace the content of a message
    pub async fn edit_message(
        &self,
        channel_id: &str,
        message_id: &str,
        content: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/channels/{}/messages/{}",
            self.api_base, channel_id, message_id
        );
        let response = self
            .client
            .patch(&url)
            .header("Authorization", self.auth_header())
            .json(&json!({ "content": content }))
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    /// Rename a thread
    pub async fn rename_thread(&self, thread_id: &str, name: &str) -> Result<()> {
        self.modify_channel(thread_id, json!({ "name": thread_name(name) }))
            .await
    }

    /// Archive a thread so it drops out of the active list
    pub async fn archive_thread(&self, thread_id: &str) -> Result<()> {
        self.modify_channel(thread_id, json!({ "archived": true }))
            .await
    }

    async fn modify_channel(&self, channel_id: &str, body: serde_json::Value) -> Result<()> {
        let url = format!("{}/channels/{}", self.api_base, channel_id);
        let response = self
            .client
            .patch(&url)
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }
}

/// Thread names are limited to 100 characters
fn thread_name(name: &str) -> String {
    name.chars().take(100).collect()
}
