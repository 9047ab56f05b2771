// src/services/detail.rs

//! Detail page photo fetcher.
//!
//! Loads an ad's own page, waits for the gallery marker and reads the photo
//! list from the page's JSON-LD block.

use std::time::Duration;

use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Config, ListingSelectors, parse_selector};
use crate::pipeline::RetryPolicy;
use crate::services::PageRenderer;

/// Photos found for an ad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoFetch {
    pub photos: Vec<String>,
    /// Every attempt failed and `photos` is the empty fallback
    pub degraded: bool,
}

/// Fetches photo URLs from ad detail pages.
#[derive(Debug)]
pub struct DetailFetcher {
    marker: String,
    structured_data: Selector,
    wait: Duration,
    retry: RetryPolicy,
}

impl DetailFetcher {
    pub fn new(selectors: &ListingSelectors, wait: Duration, retry: RetryPolicy) -> Result<Self> {
        Ok(Self {
            marker: selectors.detail_marker.clone(),
            structured_data: parse_selector(&selectors.structured_data)?,
            wait,
            retry,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.selectors,
            config.renderer.detail_wait(),
            RetryPolicy::from_config(&config.detail),
        )
    }

    /// Fetch the photo list for `link`.
    ///
    /// Never fails: once the retry budget is spent the result is an empty
    /// list flagged as degraded, and the ad goes out without photos.
    pub async fn fetch_photos(&self, renderer: &dyn PageRenderer, link: &str) -> PhotoFetch {
        let result = self
            .retry
            .run(link, move |_| self.fetch_once(renderer, link))
            .await;

        match result {
            Ok(photos) => PhotoFetch {
                photos,
                degraded: false,
            },
            Err(e) => {
                log::warn!("No photos for {link}, sending without them: {e}");
                PhotoFetch {
                    photos: Vec::new(),
                    degraded: true,
                }
            }
        }
    }

    async fn fetch_once(&self, renderer: &dyn PageRenderer, link: &str) -> Result<Vec<String>> {
        let html = renderer.render(link, &self.marker, self.wait).await?;
        self.extract_photos(&html, link)
    }

    /// Read the `image` field of the first JSON-LD block.
    fn extract_photos(&self, html: &str, link: &str) -> Result<Vec<String>> {
        let document = Html::parse_document(html);
        let block = document
            .select(&self.structured_data)
            .next()
            .ok_or_else(|| AppError::MissingStructuredData(link.to_string()))?;

        let raw: String = block.text().collect();
        let data: Value = serde_json::from_str(raw.trim())?;
        Ok(photo_urls(&data))
    }
}

/// Normalize a JSON-LD document's `image` field into a list of URLs.
///
/// Accepts a single URL, a list of URLs, or `ImageObject`s carrying `url` or
/// `contentUrl`. A top-level array is searched for the first node with an
/// `image` field.
fn photo_urls(data: &Value) -> Vec<String> {
    let image = match data {
        Value::Array(nodes) => nodes.iter().find_map(|n| n.get("image")),
        other => other.get("image"),
    };

    let Some(image) = image else {
        return Vec::new();
    };

    let entries: Vec<&Value> = match image {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(url) => Some(url.as_str()),
            Value::Object(obj) => obj
                .get("url")
                .or_else(|| obj.get("contentUrl"))
                .and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;

    const LINK: &str = "https://www.olx.ua/d/uk/obyavlenie/canon-ixus-135-IDx1.html";

    fn detail_page(image: Value) -> String {
        format!(
            r#"<html><head>
                 <script type="application/ld+json">{}</script>
               </head><body><img data-testid="swiper-image" src="a.jpg"></body></html>"#,
            json!({ "@type": "Product", "name": "Canon IXUS 135", "image": image })
        )
    }

    /// Renderer that replays scripted responses in order.
    struct ScriptedRenderer {
        responses: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<usize>,
    }

    impl ScriptedRenderer {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(0),
            }
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl PageRenderer for ScriptedRenderer {
        async fn render(&self, url: &str, marker: &str, _wait: Duration) -> Result<String> {
            *self.calls.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(AppError::render_timeout(url, marker, 15)))
        }
    }

    fn fetcher(retries: u32) -> DetailFetcher {
        DetailFetcher::new(
            &ListingSelectors::default(),
            Duration::from_secs(15),
            RetryPolicy::new(retries, Duration::ZERO),
        )
        .unwrap()
    }

    #[test]
    fn test_photo_urls_single_string() {
        let urls = photo_urls(&json!({ "image": "https://img/1.jpg" }));
        assert_eq!(urls, vec!["https://img/1.jpg"]);
    }

    #[test]
    fn test_photo_urls_list_and_objects() {
        let urls = photo_urls(&json!({
            "image": [
                "https://img/1.jpg",
                { "@type": "ImageObject", "contentUrl": "https://img/2.jpg" },
                { "url": "https://img/3.jpg" },
                42,
                ""
            ]
        }));
        assert_eq!(
            urls,
            vec!["https://img/1.jpg", "https://img/2.jpg", "https://img/3.jpg"]
        );
    }

    #[test]
    fn test_photo_urls_missing_field() {
        assert!(photo_urls(&json!({ "name": "x" })).is_empty());
        assert!(photo_urls(&json!(null)).is_empty());
    }

    #[test]
    fn test_photo_urls_top_level_array() {
        let urls = photo_urls(&json!([{ "@type": "BreadcrumbList" }, { "image": "https://img/9.jpg" }]));
        assert_eq!(urls, vec!["https://img/9.jpg"]);
    }

    #[test]
    fn test_missing_block_is_an_error() {
        let err = fetcher(0)
            .extract_photos("<html><body>no data</body></html>", LINK)
            .unwrap_err();
        assert!(matches!(err, AppError::MissingStructuredData(_)));
    }

    #[test]
    fn test_malformed_block_is_an_error() {
        let html = r#"<script type="application/ld+json">{"image": [</script>"#;
        assert!(matches!(
            fetcher(0).extract_photos(html, LINK),
            Err(AppError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_succeeds_on_third_attempt() {
        let renderer = ScriptedRenderer::new(vec![
            Err(AppError::render(LINK, "net::ERR_CONNECTION_RESET")),
            Ok("<html><body>half loaded</body></html>".to_string()),
            Ok(detail_page(json!(["https://img/1.jpg", "https://img/2.jpg"]))),
        ]);

        let fetch = fetcher(2).fetch_photos(&renderer, LINK).await;
        assert_eq!(renderer.calls(), 3);
        assert!(!fetch.degraded);
        assert_eq!(fetch.photos, vec!["https://img/1.jpg", "https://img/2.jpg"]);
    }

    #[tokio::test]
    async fn test_degrades_to_empty_after_budget() {
        let renderer = ScriptedRenderer::new(vec![
            Err(AppError::render_timeout(LINK, "img", 15)),
            Err(AppError::render_timeout(LINK, "img", 15)),
            Err(AppError::render_timeout(LINK, "img", 15)),
            Ok(detail_page(json!("https://img/late.jpg"))),
        ]);

        let fetch = fetcher(2).fetch_photos(&renderer, LINK).await;
        assert_eq!(renderer.calls(), 3);
        assert!(fetch.degraded);
        assert!(fetch.photos.is_empty());
    }

    #[tokio::test]
    async fn test_block_without_images_is_not_retried() {
        let renderer = ScriptedRenderer::new(vec![Ok(detail_page(Value::Null))]);

        let fetch = fetcher(2).fetch_photos(&renderer, LINK).await;
        assert_eq!(renderer.calls(), 1);
        assert!(!fetch.degraded);
        assert!(fetch.photos.is_empty());
    }
}
