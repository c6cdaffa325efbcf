//! Search-results parser
//!
//! This module finds product links on a search-results page and turns them
//! into normalized, absolute product URLs.

use crate::url::{normalize_product_url, PRODUCT_PATH_MARKER};
use scraper::{Html, Selector};
use url::Url;

/// Result-card title links
const PRIMARY_LINK_SELECTOR: &str = "a.a-link-normal.s-no-outline[href*='/dp/']";

/// Any normal link to a product, used when the layout has no result cards
const FALLBACK_LINK_SELECTOR: &str = "a.a-link-normal[href*='/dp/']";

/// Product links found on one results page
#[derive(Debug, Clone, Default)]
pub struct ParsedResults {
    /// Normalized product URLs in document order; may repeat
    pub links: Vec<String>,

    /// True when the primary selector matched nothing
    pub used_fallback: bool,
}

/// Parses a search-results page and extracts its product links
///
/// # Link Extraction Rules
///
/// - Links are taken from the primary selector; the broader fallback is
///   queried only when the primary selector matches nothing
/// - Only hrefs pointing at a product page (`/dp/`) are kept
/// - Each href is normalized (tracking segment, query and fragment removed,
///   resolved against `base_url`)
///
/// # Arguments
///
/// * `html` - The results page body
/// * `base_url` - The site origin for resolving relative links
///
/// # Example
///
/// ```
/// use product_scrape::crawler::parse_search_results;
/// use url::Url;
///
/// let html = r#"<a class="a-link-normal s-no-outline" href="/dp/B01/ref=sr_1_1">Phone</a>"#;
/// let base = Url::parse("https://www.amazon.in").unwrap();
/// let parsed = parse_search_results(html, &base);
/// assert_eq!(parsed.links, vec!["https://www.amazon.in/dp/B01"]);
/// ```
pub fn parse_search_results(html: &str, base_url: &Url) -> ParsedResults {
    let document = Html::parse_document(html);
    extract_product_links(&document, base_url)
}

/// Extracts product links from an already parsed results page
///
/// The fallback selector is consulted only when the primary selector matches
/// no element at all. Primary matches whose hrefs fail normalization still
/// count as matches.
pub fn extract_product_links(document: &Html, base_url: &Url) -> ParsedResults {
    let (matched, links) = select_links(document, PRIMARY_LINK_SELECTOR, base_url);
    if matched > 0 {
        return ParsedResults {
            links,
            used_fallback: false,
        };
    }

    let (_, links) = select_links(document, FALLBACK_LINK_SELECTOR, base_url);
    ParsedResults {
        links,
        used_fallback: true,
    }
}

/// Returns the number of matched elements and the product links among them
fn select_links(document: &Html, selector: &str, base_url: &Url) -> (usize, Vec<String>) {
    let Ok(selector) = Selector::parse(selector) else {
        tracing::error!("Invalid link selector: {}", selector);
        return (0, Vec::new());
    };

    let elements: Vec<_> = document.select(&selector).collect();
    let links = elements
        .iter()
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| href.contains(PRODUCT_PATH_MARKER))
        .filter_map(|href| match normalize_product_url(href, base_url) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::debug!("Skipping link {}: {}", href, e);
                None
            }
        })
        .collect();

    (elements.len(), links)
}
