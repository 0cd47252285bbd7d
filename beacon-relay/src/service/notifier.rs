//! Notification channel
//!
//! The chat side of the relay: one thread per pipeline holding a single
//! status message that is edited in place.

use anyhow::{Context, Result};
use async_trait::async_trait;
use beacon_client::DiscordClient;
use beacon_core::domain::message::MessageHandle;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

/// Service trait for posting and updating status messages
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Opens a thread in a channel and returns the thread id
    async fn open_thread(&self, channel_id: &str, title: &str, body: &str) -> Result<String>;

    /// Posts a message in a thread
    async fn send_message(
        &self,
        channel_id: &str,
        thread_id: &str,
        body: &str,
    ) -> Result<MessageHandle>;

    /// Replaces a message's body and summary title
    ///
    /// Re-sending identical content is harmless.
    async fn edit_message(&self, handle: &MessageHandle, body: &str, title: &str) -> Result<()>;

    /// Marks a message as final; no edits follow
    async fn close_message(&self, handle: &MessageHandle) -> Result<()>;
}

/// Discord implementation of NotificationChannel
///
/// The summary title is shown as the thread name. Discord heavily rate-limits
/// thread renames, so the last name per thread is remembered and the thread
/// is only renamed when the title actually changes.
pub struct DiscordNotifier {
    client: DiscordClient,
    thread_names: Mutex<HashMap<String, String>>,
}

impl DiscordNotifier {
    pub fn new(client: DiscordClient) -> Self {
        Self {
            client,
            thread_names: Mutex::new(HashMap::new()),
        }
    }

    /// Thread name cache, recovered if a holder panicked
    fn names(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.thread_names.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn needs_rename(&self, thread_id: &str, title: &str) -> bool {
        self.names().get(thread_id).map(String::as_str) != Some(title)
    }

    fn remember_name(&self, thread_id: &str, title: &str) {
        self.names().insert(thread_id.to_string(), title.to_string());
    }
}

#[async_trait]
impl NotificationChannel for DiscordNotifier {
    async fn open_thread(&self, channel_id: &str, title: &str, body: &str) -> Result<String> {
        let intro = self
            .client
            .create_message(channel_id, body)
            .await
            .context("Failed to post thread intro")?;

        let thread = self
            .client
            .start_thread(channel_id, &intro.id, title)
            .await
            .context("Failed to start thread")?;

        debug!(
            "Opened thread {} ({})",
            thread.id,
            thread.name.as_deref().unwrap_or(title)
        );
        self.remember_name(&thread.id, title);
        Ok(thread.id)
    }

    async fn send_message(
        &self,
        channel_id: &str,
        thread_id: &str,
        body: &str,
    ) -> Result<MessageHandle> {
        let message = self
            .client
            .create_message(thread_id, body)
            .await
            .context("Failed to post status message")?;

        Ok(MessageHandle {
            channel_id: channel_id.to_string(),
            thread_id: thread_id.to_string(),
            message_id: message.id,
        })
    }

    async fn edit_message(&self, handle: &MessageHandle, body: &str, title: &str) -> Result<()> {
        self.client
            .edit_message(&handle.thread_id, &handle.message_id, body)
            .await
            .context("Failed to edit status message")?;

        if self.needs_rename(&handle.thread_id, title) {
            match self.client.rename_thread(&handle.thread_id, title).await {
                Ok(()) => self.remember_name(&handle.thread_id, title),
                // The next edit retries the rename
                Err(e) if e.is_rate_limited() => {
                    warn!("Rename of thread {} is rate limited", handle.thread_id)
                }
                Err(e) => return Err(e).context("Failed to rename thread"),
            }
        }

        Ok(())
    }

    async fn close_message(&self, handle: &MessageHandle) -> Result<()> {
        self.names().remove(&handle.thread_id);

        match self.client.archive_thread(&handle.thread_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!("Thread {} is already gone", handle.thread_id);
                Ok(())
            }
            Err(e) => Err(e).context("Failed to archive thread"),
        }
    }
}
