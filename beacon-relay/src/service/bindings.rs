//! Project bindings
//!
//! Maps a CI project to the chat channel its pipelines are announced in.

use async_trait::async_trait;
use std::collections::HashMap;

/// Service trait for looking up a project's chat channel
#[async_trait]
pub trait ProjectBindings: Send + Sync {
    /// Returns the channel bound to a project, if any
    async fn channel_for(&self, project_id: u64) -> Option<String>;
}

/// Bindings fixed at startup from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticProjectBindings {
    channels: HashMap<u64, String>,
}

impl StaticProjectBindings {
    pub fn new(channels: HashMap<u64, String>) -> Self {
        Self { channels }
    }
}

#[async_trait]
impl ProjectBindings for StaticProjectBindings {
    async fn channel_for(&self, project_id: u64) -> Option<String> {
        self.channels.get(&project_id).cloned()
    }
}
