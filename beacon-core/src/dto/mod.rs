//! Data Transfer Objects for inbound webhooks
//!
//! Wire shapes of the payloads the CI backend delivers. They are converted
//! into the normalized events of [`crate::domain::event`] at the ingress.

pub mod gitlab;
