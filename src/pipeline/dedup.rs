//! Delivered-id tracking.
//!
//! Keeps the in-memory view of which ads went out, backed by a
//! [`SentIdStore`]. An id enters the set only after its notification was
//! accepted, so a failed delivery is retried on the next cycle.

use std::collections::HashSet;

use crate::error::Result;
use crate::storage::SentIdStore;

/// In-memory set of delivered ids, seeded from the store at startup.
#[derive(Debug, Default)]
pub struct DedupTracker {
    seen: HashSet<String>,
}

impl DedupTracker {
    /// Seed the tracker with every id the store already holds.
    pub async fn load(store: &dyn SentIdStore) -> Result<Self> {
        let seen = store.load_all().await?;
        log::info!("Loaded {} delivered ad ids", seen.len());
        Ok(Self { seen })
    }

    pub fn is_known(&self, ad_id: &str) -> bool {
        self.seen.contains(ad_id)
    }

    /// Record a successful delivery.
    ///
    /// The id is marked in memory first. A store failure is logged and does
    /// not undo that, so the ad is not re-sent during this process lifetime.
    pub async fn record_delivered(&mut self, store: &dyn SentIdStore, ad_id: &str) {
        self.seen.insert(ad_id.to_string());

        match store.insert_if_absent(ad_id).await {
            Ok(true) => log::debug!("Persisted delivered id {ad_id}"),
            Ok(false) => log::debug!("Delivered id {ad_id} was already persisted"),
            Err(e) => log::error!(
                "Ad {ad_id} was delivered but could not be persisted; it may be re-sent after restart: {e}"
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
