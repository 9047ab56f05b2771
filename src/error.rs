// src/error.rs

//! Unified error handling for the monitor.

use std::fmt;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Sent-id database failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Page could not be loaded by the renderer
    #[error("Render error for {url}: {message}")]
    Render { url: String, message: String },

    /// Content marker never showed up within the wait budget
    #[error("Timed out after {waited_secs}s waiting for '{marker}' on {url}")]
    RenderTimeout {
        url: String,
        marker: String,
        waited_secs: u64,
    },

    /// Detail page carries no JSON-LD block
    #[error("No structured data block on {0}")]
    MissingStructuredData(String),

    /// Messaging endpoint rejected or failed a delivery
    #[error("Notify error ({method}): {message}")]
    Notify { method: String, message: String },

    /// Anything that should never happen inside a cycle
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a render error for a URL.
    pub fn render(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Render {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a marker timeout error.
    pub fn render_timeout(url: impl Into<String>, marker: impl Into<String>, waited_secs: u64) -> Self {
        Self::RenderTimeout {
            url: url.into(),
            marker: marker.into(),
            waited_secs,
        }
    }

    /// Create a delivery error for a notifier method.
    pub fn notify(method: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Notify {
            method: method.into(),
            message: message.to_string(),
        }
    }

    /// Create an unexpected error.
    pub fn unexpected(message: impl fmt::Display) -> Self {
        Self::Unexpected(message.to_string())
    }

    /// Whether the error belongs to the startup configuration class.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::Config(_) | Self::Validation(_) | Self::Selector { .. } | Self::Toml(_)
        )
    }
}
