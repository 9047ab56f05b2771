//! Local filesystem sent-id store.
//!
//! Keeps the id set as a sorted JSON array for development runs without a
//! database. Every operation reads the file fresh; writes go to a temp file
//! that is renamed over the original.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::SentIdStore;

/// JSON-file sent-id store.
pub struct FileSentIdStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSentIdStore {
    /// Create a store persisted at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the id set, returning None if the file doesn't exist.
    async fn read_ids(&self) -> Result<Option<BTreeSet<String>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the id set atomically (write to temp, then rename).
    async fn write_ids(&self, ids: &BTreeSet<String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(ids)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl SentIdStore for FileSentIdStore {
    async fn ensure_schema(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if self.read_ids().await?.is_none() {
            log::info!("Creating sent-id file at {}", self.path.display());
            self.write_ids(&BTreeSet::new()).await?;
        }
        Ok(())
    }

    async fn load_all(&self) -> Result<HashSet<String>> {
        Ok(self
            .read_ids()
            .await?
            .unwrap_or_default()
            .into_iter()
            .collect())
    }

    async fn insert_if_absent(&self, ad_id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut ids = self.read_ids().await?.unwrap_or_default();
        if !ids.insert(ad_id.to_string()) {
            return Ok(false);
        }
        self.write_ids(&ids).await?;
        Ok(true)
    }
}
