//! Headless Chrome renderer.
//!
//! Drives one browser with one tab over the DevTools protocol. The session is
//! launched once and reused for every navigation; [`ChromeRenderer::shutdown`]
//! closes the browser and waits for the process to exit.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::models::RendererConfig;
use crate::services::PageRenderer;

/// Renderer backed by a single headless Chrome tab.
pub struct ChromeRenderer {
    // Only taken in `shutdown`; the lock makes the renderer `Sync` for `PageRenderer`.
    browser: Mutex<Browser>,
    page: Page,
    handler: JoinHandle<()>,
    page_load_timeout: Duration,
    poll_interval: Duration,
}

impl ChromeRenderer {
    /// Launch the browser and open the tab used for all navigations.
    pub async fn launch(config: &RendererConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(config.page_load_timeout())
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-blink-features=AutomationControlled")
            .arg(format!("--user-agent={}", config.user_agent));

        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &config.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder
            .build()
            .map_err(|e| AppError::render("browser", format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::render("browser", format!("launch failed: {e}")))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    log::debug!("Browser handler error: {e}");
                }
            }
            log::debug!("Browser handler task completed");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::render("about:blank", e))?;

        log::info!(
            "Browser session started ({})",
            if config.headless { "headless" } else { "headed" }
        );

        Ok(Self {
            browser: Mutex::new(browser),
            page,
            handler,
            page_load_timeout: config.page_load_timeout(),
            poll_interval: config.poll_interval(),
        })
    }

    /// Close the browser and wait for its process to exit.
    pub async fn shutdown(self) {
        let mut browser = self.browser.into_inner();

        if let Err(e) = browser.close().await {
            log::warn!("Failed to close browser: {e}");
        }
        if let Err(e) = browser.wait().await {
            log::warn!("Failed to wait for browser exit: {e}");
        }
        self.handler.abort();
        log::info!("Browser session closed");
    }

    async fn wait_for_marker(&self, url: &str, marker: &str, wait: Duration) -> Result<()> {
        let start = Instant::now();
        loop {
            if self.page.find_element(marker).await.is_ok() {
                log::debug!("'{marker}' appeared on {url} after {:?}", start.elapsed());
                return Ok(());
            }
            if start.elapsed() >= wait {
                return Err(AppError::render_timeout(url, marker, wait.as_secs()));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str, marker: &str, wait: Duration) -> Result<String> {
        match tokio::time::timeout(self.page_load_timeout, self.page.goto(url)).await {
            Err(_) => {
                return Err(AppError::render(
                    url,
                    format!("page load exceeded {}s", self.page_load_timeout.as_secs()),
                ));
            }
            Ok(Err(e)) => return Err(AppError::render(url, e)),
            Ok(Ok(_)) => {}
        }

        self.wait_for_marker(url, marker, wait).await?;

        self.page
            .content()
            .await
            .map_err(|e| AppError::render(url, e))
    }
}
