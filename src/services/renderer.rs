//! Page renderer abstraction.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// Something that can load a URL, let its scripts run, and hand back markup.
///
/// Implementations hold a single long-lived session; callers use it
/// sequentially.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    /// Navigate to `url`, wait up to `wait` for an element matching `marker`,
    /// and return the rendered document.
    ///
    /// A marker that never appears yields [`AppError::RenderTimeout`];
    /// navigation failures yield [`AppError::Render`].
    ///
    /// [`AppError::RenderTimeout`]: crate::error::AppError::RenderTimeout
    /// [`AppError::Render`]: crate::error::AppError::Render
    async fn render(&self, url: &str, marker: &str, wait: Duration) -> Result<String>;
}
