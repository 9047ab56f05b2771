// src/models/ad.rs

//! Advertisement data structure and its derived classification.

/// One classifieds listing as seen during a single poll.
///
/// Identity is `id`; every other field is a snapshot taken when the listing
/// page was rendered and is never reconciled across polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    /// Site-assigned unique identifier
    pub id: String,

    /// Listing title as displayed on the card
    pub title: String,

    /// Price display text (not parsed)
    pub price: String,

    /// Publication date display text, or the configured fallback
    pub date: String,

    /// Absolute URL of the ad's detail page
    pub link: String,

    /// Photo URLs in page order, filled in by the detail fetch
    pub photos: Vec<String>,
}

impl Advertisement {
    /// Replace the photo list.
    pub fn with_photos(mut self, photos: Vec<String>) -> Self {
        self.photos = photos;
        self
    }
}

/// Dispatch tier derived from the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    Priority,
    Standard,
}

impl Tier {
    pub fn is_priority(self) -> bool {
        matches!(self, Tier::Priority)
    }
}

/// Result of running a title through the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    /// Title matches the product family filter
    pub included: bool,

    /// Title mentions a priority model
    pub priority: bool,
}

impl Classification {
    /// Tier for dispatch ordering, `None` when the ad is filtered out.
    pub fn tier(&self) -> Option<Tier> {
        match (self.included, self.priority) {
            (false, _) => None,
            (true, true) => Some(Tier::Priority),
            (true, false) => Some(Tier::Standard),
        }
    }
}
