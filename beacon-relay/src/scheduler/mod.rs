//! Scheduler layer for the relay
//!
//! Background loops that run alongside webhook handling. Each tracked
//! pipeline gets one watcher that tails its running job's log.

pub mod watcher;

pub use watcher::{WatchState, Watcher};
