// src/services/listing.rs

//! Listing page parser.
//!
//! Turns a rendered listing page into candidate ads using configured CSS
//! selectors. A card that cannot be read is skipped and logged; it never fails
//! the page.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{Advertisement, ListingSelectors, parse_selector};
use crate::utils::{normalize_whitespace, resolve_url};

/// Cards extracted from one listing page.
#[derive(Debug, Default)]
pub struct ParsedPage {
    /// Readable, not-yet-delivered cards in page order
    pub cards: Vec<Advertisement>,
    /// Card elements found on the page
    pub seen: usize,
    /// Cards dropped for missing fields
    pub skipped: usize,
    /// Cards dropped for a missing or already delivered id
    pub known: usize,
}

/// Parser for classifieds listing pages.
#[derive(Debug)]
pub struct ListingParser {
    card: Selector,
    title: Selector,
    price: Selector,
    link: Selector,
    location_date: Selector,
    id_attr: String,
    link_attr: String,
    date_delimiter: String,
    date_fallback: String,
}

impl ListingParser {
    /// Compile the selectors; an invalid selector is a configuration error.
    pub fn new(selectors: &ListingSelectors, date_fallback: impl Into<String>) -> Result<Self> {
        Ok(Self {
            card: parse_selector(&selectors.card)?,
            title: parse_selector(&selectors.title)?,
            price: parse_selector(&selectors.price)?,
            link: parse_selector(&selectors.link)?,
            location_date: parse_selector(&selectors.location_date)?,
            id_attr: selectors.id_attr.clone(),
            link_attr: selectors.link_attr.clone(),
            date_delimiter: selectors.date_delimiter.clone(),
            date_fallback: date_fallback.into(),
        })
    }

    /// Parse `html` rendered from `page_url`.
    ///
    /// Cards whose id is missing or for which `is_known` returns true are
    /// dropped before any other field is read.
    pub fn parse(
        &self,
        html: &str,
        page_url: &str,
        is_known: impl Fn(&str) -> bool,
    ) -> Result<ParsedPage> {
        let base_url = Url::parse(page_url)?;
        let document = Html::parse_document(html);
        let mut page = ParsedPage::default();

        for card in document.select(&self.card) {
            page.seen += 1;

            let id = match card.value().attr(&self.id_attr).map(str::trim) {
                Some(id) if !id.is_empty() && !is_known(id) => id,
                _ => {
                    page.known += 1;
                    continue;
                }
            };

            match self.parse_card(&card, id, &base_url) {
                Ok(ad) => page.cards.push(ad),
                Err(missing) => {
                    page.skipped += 1;
                    log::warn!("Skipping card {id} on {page_url}: missing {missing}");
                }
            }
        }

        log::debug!(
            "Parsed {} cards from {} ({} known, {} skipped)",
            page.cards.len(),
            page_url,
            page.known,
            page.skipped
        );
        Ok(page)
    }

    fn parse_card(
        &self,
        card: &ElementRef,
        id: &str,
        base_url: &Url,
    ) -> std::result::Result<Advertisement, &'static str> {
        let title = Self::text_of(card, &self.title).ok_or("title")?;
        let price = Self::text_of(card, &self.price).ok_or("price")?;
        let href = card
            .select(&self.link)
            .find_map(|a| a.value().attr(&self.link_attr))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .ok_or("link")?;

        let date = Self::text_of(card, &self.location_date)
            .and_then(|text| self.split_date(&text))
            .unwrap_or_else(|| self.date_fallback.clone());

        Ok(Advertisement {
            id: id.to_string(),
            title,
            price,
            date,
            link: resolve_url(base_url, href),
            photos: Vec::new(),
        })
    }

    /// Text after the last delimiter of a "location - date" string.
    fn split_date(&self, location_date: &str) -> Option<String> {
        let (_, date) = location_date.rsplit_once(self.date_delimiter.as_str())?;
        let date = date.trim();
        (!date.is_empty()).then(|| date.to_string())
    }

    fn text_of(card: &ElementRef, selector: &Selector) -> Option<String> {
        let element = card.select(selector).next()?;
        let text = normalize_whitespace(&element.text().collect::<String>());
        (!text.is_empty()).then_some(text)
    }
}
