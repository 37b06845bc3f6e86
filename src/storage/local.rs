//! Local filesystem storage implementation.
//!
//! Persists the seen-link set and per-document checkpoints as JSON files
//! under one root directory. Writes go to a temp file first and are renamed
//! into place, so a crash mid-write leaves the previous file intact.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── seen.json           # SeenIndex
//! └── checkpoints.json    # document → Checkpoint
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::{Checkpoint, CheckpointStore, SeenStore};

const SEEN_KEY: &str = "seen.json";
const CHECKPOINTS_KEY: &str = "checkpoints.json";

/// Contents of `seen.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeenIndex {
    pub updated_at: Option<DateTime<Utc>>,
    pub entries: BTreeMap<String, DateTime<Utc>>,
}

/// Local filesystem storage backend.
pub struct LocalStorage {
    root_dir: PathBuf,
    /// Loaded lazily; every record writes through to disk.
    seen: Mutex<Option<SeenIndex>>,
    checkpoints: Mutex<()>,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            seen: Mutex::new(None),
            checkpoints: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load the full seen index from disk.
    pub async fn load_seen(&self) -> Result<SeenIndex> {
        Ok(self
            .read_json::<SeenIndex>(SEEN_KEY)
            .await
            .map_err(|e| AppError::store(format!("cannot read {SEEN_KEY}: {e}")))?
            .unwrap_or_default())
    }

    /// Load every saved checkpoint.
    pub async fn load_checkpoints(&self) -> Result<BTreeMap<String, Checkpoint>> {
        Ok(self
            .read_json(CHECKPOINTS_KEY)
            .await
            .map_err(|e| AppError::store(format!("cannot read {CHECKPOINTS_KEY}: {e}")))?
            .unwrap_or_default())
    }
}

#[async_trait]
impl SeenStore for LocalStorage {
    async fn exists(&self, key: &str) -> Result<bool> {
        let mut cache = self.seen.lock().await;
        if cache.is_none() {
            *cache = Some(self.load_seen().await?);
        }
        Ok(cache
            .as_ref()
            .is_some_and(|index| index.entries.contains_key(key)))
    }

    async fn record(&self, key: &str, at: DateTime<Utc>) -> Result<()> {
        let mut cache = self.seen.lock().await;
        let mut index = match cache.take() {
            Some(index) => index,
            None => self.load_seen().await?,
        };

        index.entries.entry(key.to_string()).or_insert(at);
        index.updated_at = Some(at);

        let written = self
            .write_json(SEEN_KEY, &index)
            .await
            .map_err(|e| AppError::store(format!("cannot write {SEEN_KEY}: {e}")));
        *cache = Some(index);
        written
    }
}

#[async_trait]
impl CheckpointStore for LocalStorage {
    async fn load_checkpoint(&self, document: &str) -> Result<Option<String>> {
        let _guard = self.checkpoints.lock().await;
        Ok(self
            .load_checkpoints()
            .await?
            .remove(document)
            .map(|checkpoint| checkpoint.revision))
    }

    async fn save_checkpoint(&self, document: &str, revision: &str) -> Result<()> {
        let _guard = self.checkpoints.lock().await;
        let mut checkpoints = self.load_checkpoints().await?;
        checkpoints.insert(
            document.to_string(),
            Checkpoint {
                revision: revision.to_string(),
                saved_at: Utc::now(),
            },
        );
        self.write_json(CHECKPOINTS_KEY, &checkpoints)
            .await
            .map_err(|e| AppError::store(format!("cannot write {CHECKPOINTS_KEY}: {e}")))?;
        log::debug!("Checkpoint for {} saved at {}", document, revision);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        storage.write_bytes("test.txt", b"hello").await.unwrap();
        let data = storage.read_bytes("test.txt").await.unwrap();
        assert_eq!(data, Some(b"hello".to_vec()));
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        let data = storage.read_bytes("nope.txt").await.unwrap();
        assert!(data.is_none());
    }

    #[tokio::test]
    async fn test_seen_survives_restart() {
        let tmp = TempDir::new().unwrap();
        {
            let storage = LocalStorage::new(tmp.path());
            assert!(!storage.exists("https://x.test/1").await.unwrap());
            storage
                .record("https://x.test/1", Utc::now())
                .await
                .unwrap();
        }

        let reopened = LocalStorage::new(tmp.path());
        assert!(reopened.exists("https://x.test/1").await.unwrap());
        assert!(!reopened.exists("https://x.test/2").await.unwrap());
        assert_eq!(reopened.load_seen().await.unwrap().entries.len(), 1);
    }

    #[tokio::test]
    async fn test_checkpoints_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());

        assert_eq!(storage.load_checkpoint("summer").await.unwrap(), None);
        storage.save_checkpoint("summer", "aaa").await.unwrap();
        storage.save_checkpoint("co-op", "bbb").await.unwrap();
        storage.save_checkpoint("summer", "ccc").await.unwrap();

        assert_eq!(
            storage.load_checkpoint("summer").await.unwrap().as_deref(),
            Some("ccc")
        );
        assert_eq!(storage.load_checkpoints().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_corrupt_seen_file_is_store_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(SEEN_KEY), b"{not json").unwrap();
        let storage = LocalStorage::new(tmp.path());

        let err = storage.exists("https://x.test/1").await.unwrap_err();
        assert!(err.is_store());
    }
}
