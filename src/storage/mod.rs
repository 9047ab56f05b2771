//! Sent-id persistence.
//!
//! The store is a durable, monotonically growing set of ad ids that have been
//! delivered. Every backend must make `insert_if_absent` idempotent: inserting
//! an id that is already present is a no-op, never an error.
//!
//! Backends are selected from the connection string:
//!
//! ```text
//! postgres://user:pw@host/db   -> PgSentIdStore   (table `sent_ids`)
//! postgresql://...             -> PgSentIdStore
//! file:/var/lib/adwatch.json   -> FileSentIdStore (JSON array on disk)
//! ```

pub mod file;
pub mod memory;
pub mod postgres;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::{AppError, Result};

// Re-export for convenience
pub use file::FileSentIdStore;
pub use memory::MemorySentIdStore;
pub use postgres::PgSentIdStore;

/// Trait for sent-id storage backends.
#[async_trait]
pub trait SentIdStore: Send + Sync {
    /// Create the backing table/file if it does not exist yet.
    async fn ensure_schema(&self) -> Result<()>;

    /// Load every delivered id.
    async fn load_all(&self) -> Result<HashSet<String>>;

    /// Record an id. Returns `true` when it was not present before.
    async fn insert_if_absent(&self, ad_id: &str) -> Result<bool>;
}

/// Open the backend named by `url`.
pub async fn open(url: &str) -> Result<Box<dyn SentIdStore>> {
    if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        let store = PgSentIdStore::connect(url).await?;
        return Ok(Box::new(store));
    }

    if let Some(path) = url.strip_prefix("file:") {
        let path = path.trim_start_matches("//");
        if path.is_empty() {
            return Err(AppError::config("file: store URL has no path"));
        }
        return Ok(Box::new(FileSentIdStore::new(path)));
    }

    Err(AppError::config(
        "Unsupported DATABASE_URL scheme (expected postgres:// or file:)",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_file_store() {
        let tmp = tempfile::TempDir::new().unwrap();
        let url = format!("file:{}", tmp.path().join("sent.json").display());

        let store = open(&url).await.unwrap();
        store.ensure_schema().await.unwrap();
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_rejects_unknown_scheme() {
        let err = open("mysql://localhost/ads").await.err().unwrap();
        assert!(err.is_config());

        let err = open("file:").await.err().unwrap();
        assert!(err.is_config());
    }
}
