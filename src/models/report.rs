//! Per-cycle counters.

use chrono::{DateTime, Utc};

/// Summary of one poll cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources_total: usize,
    pub sources_failed: usize,
    /// Cards found on all rendered pages
    pub cards_seen: usize,
    /// Cards dropped for missing fields
    pub cards_skipped: usize,
    /// Cards dropped for a missing or already delivered id
    pub cards_known: usize,
    /// Cards whose title failed the filter
    pub cards_excluded: usize,
    pub queued_priority: usize,
    pub queued_standard: usize,
    pub delivered: usize,
    pub delivery_failures: usize,
    /// Ads delivered without photos because the detail fetch gave up
    pub photo_fallbacks: usize,
}

impl CycleReport {
    pub fn new(sources_total: usize) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            sources_total,
            sources_failed: 0,
            cards_seen: 0,
            cards_skipped: 0,
            cards_known: 0,
            cards_excluded: 0,
            queued_priority: 0,
            queued_standard: 0,
            delivered: 0,
            delivery_failures: 0,
            photo_fallbacks: 0,
        }
    }

    pub fn queued(&self) -> usize {
        self.queued_priority + self.queued_standard
    }

    /// Stamp the finish time.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    /// Label/value pairs for the log summary.
    pub fn summary_items(&self) -> Vec<(&'static str, String)> {
        let elapsed = (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0;
        vec![
            (
                "Sources",
                format!(
                    "{}/{} rendered",
                    self.sources_total - self.sources_failed,
                    self.sources_total
                ),
            ),
            (
                "Cards",
                format!(
                    "{} seen, {} known, {} excluded, {} skipped",
                    self.cards_seen, self.cards_known, self.cards_excluded, self.cards_skipped
                ),
            ),
            (
                "Queued",
                format!(
                    "{} priority, {} standard",
                    self.queued_priority, self.queued_standard
                ),
            ),
            (
                "Delivered",
                format!(
                    "{} ok, {} failed, {} without photos",
                    self.delivered, self.delivery_failures, self.photo_fallbacks
                ),
            ),
            ("Elapsed", format!("{elapsed:.1}s")),
        ]
    }
}
