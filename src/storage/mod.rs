//! Storage abstractions for dedup and polling state.
//!
//! Two kinds of state outlive a process:
//! - Seen links: every apply link already notified, so restarts never repeat one
//! - Checkpoints: the last revision processed per watched document
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── seen.json           # apply link → first-notified timestamp
//! └── checkpoints.json    # document name → last processed revision
//! ```

pub mod local;
pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStore;

/// Durable set of keys that were already notified.
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Whether `key` was recorded before.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Record `key` as notified at `at`.
    async fn record(&self, key: &str, at: DateTime<Utc>) -> Result<()>;
}

/// Last processed revision per document.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load_checkpoint(&self, document: &str) -> Result<Option<String>>;

    async fn save_checkpoint(&self, document: &str, revision: &str) -> Result<()>;
}

/// One saved checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub revision: String,
    pub saved_at: DateTime<Utc>,
}

/// A seen store view whose keys carry a fixed prefix.
///
/// Gives each variant its own seen set inside one backing store.
pub struct ScopedStore<'a> {
    inner: &'a dyn SeenStore,
    prefix: String,
}

impl<'a> ScopedStore<'a> {
    pub fn new(inner: &'a dyn SeenStore, scope: &str) -> Self {
        let prefix = if scope.is_empty() {
            String::new()
        } else {
            format!("{scope}::")
        };
        Self { inner, prefix }
    }

    /// Shares keys with every other unscoped view.
    pub fn global(inner: &'a dyn SeenStore) -> Self {
        Self::new(inner, "")
    }

    pub fn key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }
}

#[async_trait]
impl SeenStore for ScopedStore<'_> {
    async fn exists(&self, key: &str) -> Result<bool> {
        self.inner.exists(&self.key(key)).await
    }

    async fn record(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        self.inner.record(&self.key(key), at).await
    }
}
