//! Chat message references

use serde::{Deserialize, Serialize};

/// Reference to a status message already posted to the chat backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageHandle {
    /// Channel the thread was opened in
    pub channel_id: String,
    /// Thread holding the message
    pub thread_id: String,
    pub message_id: String,
}
