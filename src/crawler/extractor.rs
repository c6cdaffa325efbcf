//! Product-page field extraction
//!
//! Every field has an ordered chain of [`Lookup`] strategies. The first one
//! that yields non-empty text wins; when the chain is exhausted the field
//! gets its sentinel or default value. Missing markup never fails a page;
//! only a structurally broken lookup does.

use crate::config::ExtractConfig;
use crate::product::{
    truncate_display, ProductRecord, DEFAULT_AVAILABILITY, NOT_AVAILABLE,
};
use scraper::{Html, Selector};
use thiserror::Error;

/// Currency glyphs stripped from raw prices in addition to the configured symbol
const CURRENCY_GLYPHS: &[char] = &['₹', '$', '€', '£', '¥'];

/// Digit-group separators removed from review counts
const GROUP_SEPARATORS: &[char] = &[',', '\u{a0}', '\u{202f}'];

/// One way of reading a field out of a product page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Trimmed text content of the first non-empty match
    Text(&'static str),
    /// Trimmed value of an attribute on the first match that carries it
    Attr(&'static str, &'static str),
}

const TITLE: &[Lookup] = &[Lookup::Text("span#productTitle"), Lookup::Text("#title")];

const PRICE: &[Lookup] = &[
    Lookup::Text("span.a-price-whole"),
    Lookup::Text("span.a-offscreen"),
];

const RATING: &[Lookup] = &[
    Lookup::Text("span.a-icon-alt"),
    Lookup::Attr("#acrPopover", "title"),
];

const REVIEWS: &[Lookup] = &[Lookup::Text("span#acrCustomerReviewText")];

const AVAILABILITY: &[Lookup] = &[
    Lookup::Text("#availability span"),
    Lookup::Text("#availability"),
];

const DESCRIPTION: &[Lookup] = &[
    Lookup::Text("#feature-bullets .a-list-item"),
    Lookup::Text("#productDescription p"),
];

/// Extraction failures that abort a single document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector '{selector}': {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
}

/// Maps product pages to [`ProductRecord`]s
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractConfig,
}

impl Extractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Parses `html` and extracts a record from it
    pub fn extract_html(&self, html: &str, source_url: &str) -> Result<ProductRecord, ExtractError> {
        let document = Html::parse_document(html);
        self.extract(&document, source_url)
    }

    /// Extracts a record from a parsed product page
    ///
    /// # Field Rules
    ///
    /// | Field | Rule | Missing |
    /// |-------|------|---------|
    /// | title | truncated to `max-title-len` + "..." | "N/A" |
    /// | price | currency glyphs stripped, configured symbol prefixed | "N/A", no symbol |
    /// | rating | leading token ("4.2 out of 5 stars" → "4.2") | "N/A" |
    /// | reviews | leading token, group separators removed | "N/A" |
    /// | availability | trimmed text | "In Stock" |
    /// | description | truncated to `max-description-len` + "..." | "N/A" |
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed product page
    /// * `source_url` - The URL the page was requested under; becomes `url`
    ///
    /// # Returns
    ///
    /// * `Ok(ProductRecord)` - All fields resolved (possibly to sentinels)
    /// * `Err(ExtractError)` - A lookup was structurally invalid
    pub fn extract(&self, document: &Html, source_url: &str) -> Result<ProductRecord, ExtractError> {
        let title = first_match(document, TITLE)?
            .map(|t| truncate_display(&t, self.config.max_title_len))
            .unwrap_or_else(not_available);

        let price = format_price(
            first_match(document, PRICE)?.as_deref(),
            &self.config.currency_symbol,
        );

        let rating = first_match(document, RATING)?
            .as_deref()
            .and_then(leading_token)
            .map(str::to_string)
            .unwrap_or_else(not_available);

        let reviews = first_match(document, REVIEWS)?
            .as_deref()
            .and_then(format_review_count)
            .unwrap_or_else(not_available);

        let availability =
            first_match(document, AVAILABILITY)?.unwrap_or_else(|| DEFAULT_AVAILABILITY.to_string());

        let description = first_match(document, DESCRIPTION)?
            .map(|d| truncate_display(&d, self.config.max_description_len))
            .unwrap_or_else(not_available);

        Ok(ProductRecord {
            title,
            price,
            rating,
            reviews,
            availability,
            description,
            url: source_url.to_string(),
        })
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_string()
}

/// Applies a lookup chain in order and returns the first non-empty value
pub fn first_match(document: &Html, chain: &[Lookup]) -> Result<Option<String>, ExtractError> {
    for lookup in chain {
        if let Some(value) = apply(document, *lookup)? {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn apply(document: &Html, lookup: Lookup) -> Result<Option<String>, ExtractError> {
    let css = match lookup {
        Lookup::Text(css) | Lookup::Attr(css, _) => css,
    };
    let selector = Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css,
        message: format!("{:?}", e),
    })?;

    let value = match lookup {
        Lookup::Text(_) => document
            .select(&selector)
            .map(|element| element.text().collect::<String>().trim().to_string())
            .find(|text| !text.is_empty()),
        Lookup::Attr(_, attr) => document
            .select(&selector)
            .filter_map(|element| element.value().attr(attr))
            .map(|value| value.trim().to_string())
            .find(|value| !value.is_empty()),
    };

    Ok(value)
}

/// Re-prefixes a raw price with the canonical currency symbol
///
/// A missing price, or one that is empty once its glyphs are gone, stays
/// "N/A" without a symbol. A dangling decimal point ("12,999.") is dropped.
pub fn format_price(raw: Option<&str>, currency_symbol: &str) -> String {
    let Some(raw) = raw else {
        return not_available();
    };

    if raw == NOT_AVAILABLE {
        return not_available();
    }

    let stripped = raw.replace(currency_symbol, "");
    let amount = stripped
        .trim_matches(|c: char| c.is_whitespace() || CURRENCY_GLYPHS.contains(&c))
        .trim_end_matches('.')
        .trim();

    if amount.is_empty() {
        return not_available();
    }

    format!("{}{}", currency_symbol, amount)
}

/// First whitespace-delimited token of `text`
pub fn leading_token(text: &str) -> Option<&str> {
    text.split_whitespace().next()
}

/// Leading token of a review line with digit grouping removed
///
/// "1,234 ratings" becomes "1234".
pub fn format_review_count(text: &str) -> Option<String> {
    let count: String = leading_token(text)?
        .chars()
        .filter(|c| !GROUP_SEPARATORS.contains(c))
        .collect();
    (!count.is_empty()).then_some(count)
}
