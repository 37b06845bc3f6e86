// src/models/mod.rs

//! Domain models for the watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod outcome;
mod posting;
mod variant;

// Re-export all public types
pub use config::{
    Config, DedupConfig, DedupScope, DeliveryConfig, DocumentConfig, FilterConfig,
    LocationMatch, SinkKind, StorageConfig, StoreFailurePolicy, WatcherConfig,
};
pub use outcome::{BatchReport, BatchStats, DuplicateOrigin, Rejection, RowOutcome};
pub use posting::{JobCandidate, NotificationPayload};
pub use variant::Variant;
