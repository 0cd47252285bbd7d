//! Service layer
//!
//! Services hold the relay's business logic. The collaborators the relay
//! depends on (log source, chat backend, project bindings) are trait-based
//! so the relay can be driven by fakes in tests.

mod bindings;
mod log_tail;
mod notifier;
mod relay;

// Re-export traits
pub use bindings::ProjectBindings;
pub use log_tail::LogTailProvider;
pub use notifier::NotificationChannel;

// Re-export implementations
pub use bindings::StaticProjectBindings;
pub use notifier::DiscordNotifier;
pub use relay::Relay;
