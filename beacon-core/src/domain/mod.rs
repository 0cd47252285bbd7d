//! Core domain types
//!
//! This module contains the in-memory state the relay tracks for each
//! in-flight pipeline, and the events that drive it.

pub mod event;
pub mod job;
pub mod message;
pub mod pipeline;
pub mod status;
