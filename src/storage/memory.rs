//! In-process storage backend.
//!
//! Holds seen keys and checkpoints for the lifetime of the value. Used for
//! dry runs and tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{AppError, Result};
use crate::storage::{CheckpointStore, SeenStore};

#[derive(Debug, Default)]
pub struct MemoryStore {
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
    checkpoints: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded keys.
    pub fn seen_count(&self) -> usize {
        self.seen.lock().map(|seen| seen.len()).unwrap_or(0)
    }

    fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
        mutex
            .lock()
            .map_err(|_| AppError::store("memory store lock poisoned"))
    }
}

#[async_trait]
impl SeenStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(Self::lock(&self.seen)?.contains_key(key))
    }

    async fn record(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        Self::lock(&self.seen)?.entry(key.to_string()).or_insert(at);
        Ok(())
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn load_checkpoint(&self, document: &str) -> Result<Option<String>> {
        Ok(Self::lock(&self.checkpoints)?.get(document).cloned())
    }

    async fn save_checkpoint(&self, document: &str, revision: &str) -> Result<()> {
        Self::lock(&self.checkpoints)?.insert(document.to_string(), revision.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_keeps_first_timestamp() {
        let store = MemoryStore::new();
        let first = Utc::now();
        store.record("k", first).await.unwrap();
        store
            .record("k", first + chrono::Duration::hours(1))
            .await
            .unwrap();

        assert!(store.exists("k").await.unwrap());
        assert_eq!(store.seen_count(), 1);
        assert_eq!(store.seen.lock().unwrap()["k"], first);
    }

    #[tokio::test]
    async fn test_checkpoints() {
        let store = MemoryStore::new();
        assert_eq!(store.load_checkpoint("summer").await.unwrap(), None);
        store.save_checkpoint("summer", "abc123").await.unwrap();
        assert_eq!(
            store.load_checkpoint("summer").await.unwrap().as_deref(),
            Some("abc123")
        );
    }
}
