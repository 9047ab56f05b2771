//! In-memory sent-id store for tests and dry runs.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::storage::SentIdStore;

/// Sent-id store that lives only as long as the process.
#[derive(Default)]
pub struct MemorySentIdStore {
    ids: Mutex<HashSet<String>>,
}

impl MemorySentIdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `ids`.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: Mutex::new(ids.into_iter().map(Into::into).collect()),
        }
    }

    pub fn contains(&self, ad_id: &str) -> bool {
        self.ids
            .lock()
            .map(|ids| ids.contains(ad_id))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.ids.lock().map(|ids| ids.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SentIdStore for MemorySentIdStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn load_all(&self) -> Result<HashSet<String>> {
        let ids = self
            .ids
            .lock()
            .map_err(|e| AppError::unexpected(format!("sent-id lock poisoned: {e}")))?;
        Ok(ids.clone())
    }

    async fn insert_if_absent(&self, ad_id: &str) -> Result<bool> {
        let mut ids = self
            .ids
            .lock()
            .map_err(|e| AppError::unexpected(format!("sent-id lock poisoned: {e}")))?;
        Ok(ids.insert(ad_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_double_insert_leaves_set_unchanged() {
        let store = MemorySentIdStore::new();

        assert!(store.insert_if_absent("42").await.unwrap());
        let after_first = store.load_all().await.unwrap();

        assert!(!store.insert_if_absent("42").await.unwrap());
        assert_eq!(store.load_all().await.unwrap(), after_first);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_with_ids() {
        let store = MemorySentIdStore::with_ids(["1", "2"]);
        assert!(store.contains("1"));
        assert_eq!(store.load_all().await.unwrap().len(), 2);
    }
}
