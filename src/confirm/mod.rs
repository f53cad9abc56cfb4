//! Confirmation tracking for broadcast transactions.

pub mod tracker;

pub use tracker::{ConfirmationEvent, ConfirmationOutcome, ConfirmationTracker, WatchSnapshot};
