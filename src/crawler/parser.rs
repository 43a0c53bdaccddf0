//! Listing page parser
//!
//! This module lifts raw product records out of a listing page. Every
//! product sits in its own card; a card with missing markup is logged and
//! skipped without affecting its siblings.

use crate::record::{capture_time, RawItemRecord};
use crate::HarvestError;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

const CARD_SELECTOR: &str = "div.collection-card";
const TITLE_SELECTOR: &str = "h3.product-title";
const PRIMARY_PRICE_SELECTOR: &str = "span.price";
const SECONDARY_PRICE_SELECTOR: &str = "p.price";
const DETAILS_SELECTOR: &str = "div.product-details";
const DETAIL_LINE_SELECTOR: &str = "p";

/// Reasons a single product card could not be turned into a record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("missing product title")]
    MissingTitle,

    #[error("missing price")]
    MissingPrice,

    #[error("missing product details")]
    MissingDetails,

    #[error("missing {0} in product details")]
    MissingDetail(&'static str),
}

/// Compiled selectors for one parse pass
struct ItemSelectors {
    card: Selector,
    title: Selector,
    primary_price: Selector,
    secondary_price: Selector,
    details: Selector,
    detail_line: Selector,
}

impl ItemSelectors {
    fn new() -> Result<Self, HarvestError> {
        Ok(Self {
            card: compile(CARD_SELECTOR)?,
            title: compile(TITLE_SELECTOR)?,
            primary_price: compile(PRIMARY_PRICE_SELECTOR)?,
            secondary_price: compile(SECONDARY_PRICE_SELECTOR)?,
            details: compile(DETAILS_SELECTOR)?,
            detail_line: compile(DETAIL_LINE_SELECTOR)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector).map_err(|e| HarvestError::HtmlParse {
        message: format!("invalid selector '{}': {:?}", selector, e),
    })
}

/// Detail lines of one card, every field absent until a line supplies it
#[derive(Debug, Default)]
struct DetailBundle {
    rating: Option<String>,
    colors: Option<String>,
    size: Option<String>,
    gender: Option<String>,
}

impl DetailBundle {
    /// Files a detail line under the first marker it contains
    fn classify(&mut self, line: String) {
        if line.contains("Rating:") {
            self.rating = Some(line);
        } else if line.contains("Colors") {
            self.colors = Some(line);
        } else if line.contains("Size:") {
            self.size = Some(line);
        } else if line.contains("Gender:") {
            self.gender = Some(line);
        }
    }

    fn is_empty(&self) -> bool {
        self.rating.is_none()
            && self.colors.is_none()
            && self.size.is_none()
            && self.gender.is_none()
    }
}

/// Extracts every product record on a listing page, in document order
///
/// Cards that fail to parse are logged and left out of the result.
///
/// # Returns
///
/// * `Ok(Vec<RawItemRecord>)` - Possibly empty list of records
/// * `Err(HarvestError)` - The page could not be processed at all
///
/// # Example
///
/// ```
/// use storefront_harvest::crawler::parse_items;
///
/// let html = r#"<div class="collection-card">
///     <h3 class="product-title">Denim Jacket</h3>
///     <span class="price">$64.24</span>
///     <div class="product-details">
///         <p>Rating: ⭐ 4.8 / 5</p><p>3 Colors</p><p>Size: M</p><p>Gender: Men</p>
///     </div>
/// </div>"#;
///
/// let items = parse_items(html).unwrap();
/// assert_eq!(items[0].title, "Denim Jacket");
/// assert_eq!(items[0].price_text, "$64.24");
/// ```
pub fn parse_items(html: &str) -> Result<Vec<RawItemRecord>, HarvestError> {
    let selectors = ItemSelectors::new()?;
    let document = Html::parse_document(html);

    let mut items = Vec::new();
    for card in document.select(&selectors.card) {
        match parse_card(card, &selectors) {
            Ok(item) => items.push(item),
            Err(e) => tracing::error!("Error parsing product item: {}", e),
        }
    }

    Ok(items)
}

fn parse_card(
    card: ElementRef<'_>,
    selectors: &ItemSelectors,
) -> Result<RawItemRecord, ItemError> {
    let title = card
        .select(&selectors.title)
        .next()
        .map(element_text)
        .ok_or(ItemError::MissingTitle)?;

    let price_text = card
        .select(&selectors.primary_price)
        .next()
        .or_else(|| card.select(&selectors.secondary_price).next())
        .map(element_text)
        .ok_or(ItemError::MissingPrice)?;

    let details = card
        .select(&selectors.details)
        .next()
        .ok_or(ItemError::MissingDetails)?;

    let mut bundle = DetailBundle::default();
    for line in details.select(&selectors.detail_line) {
        bundle.classify(element_text(line));
    }

    if bundle.is_empty() {
        return Err(ItemError::MissingDetails);
    }

    Ok(RawItemRecord {
        title,
        price_text,
        rating_text: bundle.rating.ok_or(ItemError::MissingDetail("rating"))?,
        colors_text: bundle.colors.ok_or(ItemError::MissingDetail("colors"))?,
        size_text: bundle.size.ok_or(ItemError::MissingDetail("size"))?,
        gender_text: bundle.gender.ok_or(ItemError::MissingDetail("gender"))?,
        captured_at: capture_time(),
    })
}

/// Joins an element's text nodes, each stripped of surrounding whitespace
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}
