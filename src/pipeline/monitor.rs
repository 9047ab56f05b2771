// src/pipeline/monitor.rs

//! The poll loop.
//!
//! One cycle renders every source page, keeps the matching cards that were
//! never delivered, and dispatches them priority first. Between cycles the
//! loop sleeps, waking early when shutdown is requested.

use std::any::Any;
use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::watch;

use crate::error::{AppError, Result};
use crate::models::{Advertisement, Config, CycleReport, MessageConfig, Tier};
use crate::pipeline::DedupTracker;
use crate::services::{
    Classifier, DetailFetcher, ListingParser, Notifier, OutgoingMessage, PageRenderer, deliver,
};
use crate::storage::SentIdStore;

/// Ads selected in one cycle, split by tier in discovery order.
#[derive(Debug, Default)]
struct Buckets {
    priority: Vec<Advertisement>,
    standard: Vec<Advertisement>,
}

/// Sequential monitor over one renderer, one notifier and one store.
pub struct Monitor<'a> {
    sources: Vec<String>,
    interval: Duration,
    card_marker: String,
    listing_wait: Duration,
    parser: ListingParser,
    classifier: Classifier,
    detail: DetailFetcher,
    labels: MessageConfig,
    renderer: &'a dyn PageRenderer,
    notifier: &'a dyn Notifier,
    store: &'a dyn SentIdStore,
}

impl<'a> Monitor<'a> {
    pub fn new(
        config: &Config,
        renderer: &'a dyn PageRenderer,
        notifier: &'a dyn Notifier,
        store: &'a dyn SentIdStore,
    ) -> Result<Self> {
        Ok(Self {
            sources: config.sources.clone(),
            interval: config.monitor.interval(),
            card_marker: config.selectors.card.clone(),
            listing_wait: config.renderer.listing_wait(),
            parser: ListingParser::new(&config.selectors, config.message.date_fallback.clone())?,
            classifier: Classifier::from_config(&config.filter),
            detail: DetailFetcher::from_config(config)?,
            labels: config.message.clone(),
            renderer,
            notifier,
            store,
        })
    }

    /// Run cycles until `shutdown` flips to `true`.
    ///
    /// Shutdown is checked between cycles; a cycle in progress always
    /// finishes. A panic inside a cycle ends the loop with an error.
    pub async fn run(
        &self,
        tracker: &mut DedupTracker,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        log::info!(
            "Watching {} source(s), polling every {}s",
            self.sources.len(),
            self.interval.as_secs()
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.run_once(tracker).await?;

            if *shutdown.borrow() {
                break;
            }

            log::debug!("Sleeping {}s until the next cycle", self.interval.as_secs());
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    // Sender dropped: nobody can request shutdown any more.
                    if changed.is_err() {
                        tokio::time::sleep(self.interval).await;
                    }
                }
            }
        }

        log::info!("Shutdown requested, monitor stopped");
        Ok(())
    }

    /// Run one cycle, turning a panic inside it into [`AppError::Unexpected`].
    pub async fn run_once(&self, tracker: &mut DedupTracker) -> Result<CycleReport> {
        AssertUnwindSafe(self.run_cycle(tracker))
            .catch_unwind()
            .await
            .map_err(|panic| {
                AppError::unexpected(format!(
                    "poll cycle panicked: {}",
                    panic_message(panic.as_ref())
                ))
            })
    }

    /// Run one poll cycle: collect, then dispatch.
    pub async fn run_cycle(&self, tracker: &mut DedupTracker) -> CycleReport {
        crate::utils::log::header("Poll cycle");
        let mut report = CycleReport::new(self.sources.len());

        let buckets = self.collect(tracker, &mut report).await;
        report.queued_priority = buckets.priority.len();
        report.queued_standard = buckets.standard.len();
        log::info!(
            "Queued {} priority and {} standard ad(s)",
            report.queued_priority,
            report.queued_standard
        );

        let queue = buckets
            .priority
            .into_iter()
            .map(|ad| (ad, Tier::Priority))
            .chain(buckets.standard.into_iter().map(|ad| (ad, Tier::Standard)));

        for (ad, tier) in queue {
            self.dispatch(ad, tier, tracker, &mut report).await;
        }

        let report = report.finish();
        crate::utils::log::summary("Poll cycle", &report.summary_items());
        report
    }

    async fn collect(&self, tracker: &DedupTracker, report: &mut CycleReport) -> Buckets {
        let mut buckets = Buckets::default();
        let mut queued = HashSet::new();

        for url in &self.sources {
            let html = match self
                .renderer
                .render(url, &self.card_marker, self.listing_wait)
                .await
            {
                Ok(html) => html,
                Err(e) => {
                    report.sources_failed += 1;
                    log::warn!("Skipping {url} this cycle: {e}");
                    continue;
                }
            };

            let page = match self.parser.parse(&html, url, |id| tracker.is_known(id)) {
                Ok(page) => page,
                Err(e) => {
                    report.sources_failed += 1;
                    log::warn!("Skipping {url} this cycle: {e}");
                    continue;
                }
            };

            report.cards_seen += page.seen;
            report.cards_skipped += page.skipped;
            report.cards_known += page.known;

            for ad in page.cards {
                let Some(tier) = self.classifier.classify(&ad.title).tier() else {
                    report.cards_excluded += 1;
                    log::debug!("Excluded {}: {}", ad.id, ad.title);
                    continue;
                };

                if !queued.insert(ad.id.clone()) {
                    report.cards_known += 1;
                    continue;
                }

                match tier {
                    Tier::Priority => buckets.priority.push(ad),
                    Tier::Standard => buckets.standard.push(ad),
                }
            }
        }

        buckets
    }

    async fn dispatch(
        &self,
        ad: Advertisement,
        tier: Tier,
        tracker: &mut DedupTracker,
        report: &mut CycleReport,
    ) {
        let fetch = self.detail.fetch_photos(self.renderer, &ad.link).await;
        if fetch.degraded {
            report.photo_fallbacks += 1;
        }

        let ad = ad.with_photos(fetch.photos);
        let message = OutgoingMessage::compose(&ad, tier, &self.labels);

        match deliver(self.notifier, &message).await {
            Ok(()) => {
                tracker.record_delivered(self.store, &ad.id).await;
                report.delivered += 1;
                log::info!(
                    "Sent {} ad {} ({} photo(s)): {}",
                    if tier.is_priority() { "priority" } else { "standard" },
                    ad.id,
                    message.photos.len(),
                    ad.title
                );
            }
            Err(e) => {
                report.delivery_failures += 1;
                log::error!("Failed to deliver ad {}, will retry next cycle: {e}", ad.id);
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
