//! Poll pipeline for the monitor.
//!
//! - `Monitor`: the render → parse → classify → notify loop
//! - `DedupTracker`: in-memory view of delivered ids
//! - `RetryPolicy`: bounded fixed-delay retry

pub mod dedup;
pub mod monitor;
pub mod retry;

pub use dedup::DedupTracker;
pub use monitor::Monitor;
pub use retry::RetryPolicy;
