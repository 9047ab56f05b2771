// src/models/mod.rs

//! Domain models for the monitor.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod ad;
mod config;
mod report;
mod selectors;

// Re-export all public types
pub use ad::{Advertisement, Classification, Tier};
pub use config::{
    Config, DetailConfig, ENV_BOT_TOKEN, ENV_CHAT_ID, ENV_DATABASE_URL, FilterConfig,
    MessageConfig, MonitorConfig, NotifierConfig, RendererConfig, Secrets,
};
pub use report::CycleReport;
pub use selectors::{ListingSelectors, parse_selector};
