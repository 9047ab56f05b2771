//! Service layer for the monitor.
//!
//! This module contains the business logic for:
//! - Page rendering (`PageRenderer`, `ChromeRenderer`)
//! - Listing parsing (`ListingParser`)
//! - Title classification (`Classifier`)
//! - Detail photo fetching (`DetailFetcher`)
//! - Notification delivery (`Notifier`, `TelegramNotifier`)

#[cfg(feature = "chrome")]
mod chrome;
mod classifier;
mod detail;
mod listing;
mod notifier;
mod renderer;
mod telegram;

#[cfg(feature = "chrome")]
pub use chrome::ChromeRenderer;
pub use classifier::Classifier;
pub use detail::{DetailFetcher, PhotoFetch};
pub use listing::{ListingParser, ParsedPage};
pub use notifier::{MAX_MEDIA_GROUP, Notifier, OutgoingMessage, deliver};
pub use renderer::PageRenderer;
pub use telegram::TelegramNotifier;
