// src/models/selectors.rs

//! CSS selectors for scraping listing and detail pages.

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors for scraping a listing page and an ad's detail page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingSelectors {
    /// Selector for each ad card; also the marker awaited on listing pages
    #[serde(default = "defaults::card")]
    pub card: String,

    /// Card attribute that carries the ad id
    #[serde(default = "defaults::id_attr")]
    pub id_attr: String,

    /// Selector for the title element within a card
    #[serde(default = "defaults::title")]
    pub title: String,

    /// Selector for the price element within a card
    #[serde(default = "defaults::price")]
    pub price: String,

    /// Selector for the link element within a card
    #[serde(default = "defaults::link")]
    pub link: String,

    /// HTML attribute for link extraction (usually "href")
    #[serde(default = "defaults::link_attr")]
    pub link_attr: String,

    /// Selector for the "location - date" element within a card
    #[serde(default = "defaults::location_date")]
    pub location_date: String,

    /// Separator between location and date
    #[serde(default = "defaults::date_delimiter")]
    pub date_delimiter: String,

    /// Marker awaited on a detail page before extraction
    #[serde(default = "defaults::detail_marker")]
    pub detail_marker: String,

    /// Selector for the JSON-LD block on a detail page
    #[serde(default = "defaults::structured_data")]
    pub structured_data: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            card: defaults::card(),
            id_attr: defaults::id_attr(),
            title: defaults::title(),
            price: defaults::price(),
            link: defaults::link(),
            link_attr: defaults::link_attr(),
            location_date: defaults::location_date(),
            date_delimiter: defaults::date_delimiter(),
            detail_marker: defaults::detail_marker(),
            structured_data: defaults::structured_data(),
        }
    }
}

impl ListingSelectors {
    /// Check that every selector string parses.
    pub fn validate(&self) -> Result<()> {
        for s in [
            &self.card,
            &self.title,
            &self.price,
            &self.link,
            &self.location_date,
            &self.detail_marker,
            &self.structured_data,
        ] {
            parse_selector(s)?;
        }
        if self.id_attr.trim().is_empty() {
            return Err(AppError::validation("selectors.id_attr is empty"));
        }
        if self.link_attr.trim().is_empty() {
            return Err(AppError::validation("selectors.link_attr is empty"));
        }
        Ok(())
    }
}

/// Parse a CSS selector, mapping failures into [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

mod defaults {
    pub fn card() -> String {
        r#"div[data-cy="l-card"]"#.into()
    }
    pub fn id_attr() -> String {
        "id".into()
    }
    pub fn title() -> String {
        r#"div[data-cy="ad-card-title"] h4"#.into()
    }
    pub fn price() -> String {
        r#"p[data-testid="ad-price"]"#.into()
    }
    pub fn link() -> String {
        "a[href]".into()
    }
    pub fn link_attr() -> String {
        "href".into()
    }
    pub fn location_date() -> String {
        r#"p[data-testid="location-date"]"#.into()
    }
    pub fn date_delimiter() -> String {
        " - ".into()
    }
    pub fn detail_marker() -> String {
        r#"img[data-testid="swiper-image"]"#.into()
    }
    pub fn structured_data() -> String {
        r#"script[type="application/ld+json"]"#.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selectors_parse() {
        assert!(ListingSelectors::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let selectors = ListingSelectors {
            price: "[[invalid".to_string(),
            ..ListingSelectors::default()
        };
        assert!(matches!(
            selectors.validate(),
            Err(AppError::Selector { .. })
        ));
    }
}
