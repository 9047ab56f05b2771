// src/lib.rs

//! adwatch library: classifieds monitor with Telegram delivery.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
