//! Beacon Core
//!
//! Core types and pure logic for the Beacon CI status relay.
//!
//! This crate contains:
//! - Domain types: tracked pipelines, their jobs and the chat messages tied to them
//! - Events: normalized pipeline-level and job-level events plus the reducer
//!   operations that apply them to a pipeline
//! - DTOs: GitLab webhook payloads and their conversion into events
//! - Rendering: the status message body and title for a pipeline

pub mod domain;
pub mod dto;
pub mod render;
