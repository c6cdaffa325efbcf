//! URL handling module for Product-Scrape
//!
//! This module builds search-result URLs, repairs concatenation artifacts
//! and normalizes product links into deduplication keys.

mod normalize;

pub use normalize::{normalize_product_url, repair_url, PRODUCT_PATH_MARKER};

use crate::UrlError;
use url::Url;

/// Path of the site's search-results endpoint
const SEARCH_PATH: &str = "/s";

/// Parses and checks the configured site origin
///
/// # Arguments
///
/// * `base_url` - The configured origin, e.g. "https://www.amazon.in"
///
/// # Returns
///
/// * `Ok(Url)` - The parsed origin
/// * `Err(UrlError)` - Not an HTTP(S) URL with a host
pub fn parse_base_url(base_url: &str) -> Result<Url, UrlError> {
    let url = Url::parse(&repair_url(base_url)).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Builds the URL of one search-results page
///
/// Page 1 carries only the search term; later pages add a `page` parameter.
/// The term is form-encoded, so spaces become `+`.
///
/// # Examples
///
/// ```
/// use product_scrape::url::search_page_url;
/// use url::Url;
///
/// let base = Url::parse("https://www.amazon.in").unwrap();
/// assert_eq!(
///     search_page_url(&base, "usb cable", 1).unwrap().as_str(),
///     "https://www.amazon.in/s?k=usb+cable"
/// );
/// assert_eq!(
///     search_page_url(&base, "usb cable", 3).unwrap().as_str(),
///     "https://www.amazon.in/s?k=usb+cable&page=3"
/// );
/// ```
pub fn search_page_url(base_url: &Url, term: &str, page: u32) -> Result<Url, UrlError> {
    let mut url = base_url
        .join(SEARCH_PATH)
        .map_err(|e| UrlError::Parse(e.to_string()))?;

    {
        let mut query = url.query_pairs_mut();
        query.append_pair("k", term);
        if page > 1 {
            query.append_pair("page", &page.to_string());
        }
    }

    Ok(url)
}
