//! HTML parser for extracting product fields
//!
//! This module locates three independent anchors in a product page:
//! - the product name heading
//! - the price value
//! - the availability-status link or button
//!
//! A missing anchor yields `None` for that field and never affects the others.

use crate::config::SelectorConfig;
use crate::monitor::item::ItemInfo;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors raised while turning a response body into an `ItemInfo`
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response body is empty, nothing to parse")]
    EmptyDocument,

    #[error("invalid {field} selector '{selector}'")]
    Selector { field: &'static str, selector: String },
}

/// Extracts `ItemInfo` records from product pages
#[derive(Debug, Clone)]
pub struct Extractor {
    name: Selector,
    price: Selector,
    availability: Selector,
    sentinel: String,
}

impl Extractor {
    /// Compiles the selectors and stores the "contact agent" sentinel
    ///
    /// # Arguments
    ///
    /// * `selectors` - CSS selectors for the name, price and availability anchors
    /// * `sentinel` - Availability text meaning "contact agent only"
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - All selectors compiled
    /// * `Err(ParseError::Selector)` - A selector is not valid CSS
    pub fn new(selectors: &SelectorConfig, sentinel: impl Into<String>) -> Result<Self, ParseError> {
        Ok(Self {
            name: compile("name", &selectors.name)?,
            price: compile("price", &selectors.price)?,
            availability: compile("availability", &selectors.availability)?,
            sentinel: sentinel.into(),
        })
    }

    /// Parses a page body and extracts the product fields
    ///
    /// # Example
    ///
    /// ```
    /// use restock_watch::config::SelectorConfig;
    /// use restock_watch::monitor::Extractor;
    ///
    /// let extractor = Extractor::new(&SelectorConfig::default(), "상담원 연결").unwrap();
    /// let html = r#"<h1 data-product-component="name"> Santos </h1>"#;
    /// let info = extractor.extract(html).unwrap();
    /// assert_eq!(info.title.as_deref(), Some("Santos"));
    /// assert_eq!(info.price, None);
    /// assert!(info.is_available());
    /// ```
    pub fn extract(&self, body: &str) -> Result<ItemInfo, ParseError> {
        if body.trim().is_empty() {
            return Err(ParseError::EmptyDocument);
        }

        let document = Html::parse_document(body);

        let title = select_text(&document, &self.name);
        let price = select_text(&document, &self.price);
        let availability = select_text(&document, &self.availability);
        let is_contact_agent_only = availability.as_deref() == Some(self.sentinel.as_str());

        Ok(ItemInfo {
            title,
            price,
            availability,
            is_contact_agent_only,
        })
    }
}

fn compile(field: &'static str, selector: &str) -> Result<Selector, ParseError> {
    Selector::parse(selector).map_err(|_| ParseError::Selector {
        field,
        selector: selector.to_string(),
    })
}

/// Trimmed text content of the first element matching `selector`
fn select_text(document: &Html, selector: &Selector) -> Option<String> {
    document.select(selector).next().map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
