use crate::UrlError;
use url::Url;

/// Path marker that identifies a product detail page
pub const PRODUCT_PATH_MARKER: &str = "/dp/";

/// Path segment prefix the site uses for click tracking
const TRACKING_SEGMENT: &str = "/ref=";

/// Strips a scheme that was glued onto the host by string concatenation
///
/// Joining a site origin with an already absolute link produces URLs such as
/// `https://www.amazon.inhttps://www.amazon.in/dp/X`, whose "host" ends in
/// `https:`. Only a scheme that terminates the authority section is treated
/// as duplicated, so URLs carrying another URL in their query are left alone.
///
/// # Examples
///
/// ```
/// use product_scrape::url::repair_url;
///
/// assert_eq!(
///     repair_url("https://www.amazon.inhttps://www.amazon.in/dp/B0C1"),
///     "https://www.amazon.in/dp/B0C1"
/// );
/// assert_eq!(
///     repair_url("https://example.com/go?to=https://other.com/"),
///     "https://example.com/go?to=https://other.com/"
/// );
/// ```
pub fn repair_url(url: &str) -> String {
    let mut current = url;

    loop {
        let Some(scheme_end) = current.find("://") else {
            return current.to_string();
        };

        let rest = &current[scheme_end + 3..];
        let authority_len = rest
            .find(|c: char| matches!(c, '/' | '?' | '#'))
            .unwrap_or(rest.len());
        let authority = &rest[..authority_len];

        let duplicated = ["https:", "http:"]
            .into_iter()
            .find(|scheme| authority.ends_with(scheme) && rest[authority_len..].starts_with("//"));

        match duplicated {
            Some(scheme) => {
                let start = scheme_end + 3 + authority_len - scheme.len();
                current = &current[start..];
            }
            None => return current.to_string(),
        }
    }
}

/// Normalizes a product link found on a search-results page
///
/// # Normalization Steps
///
/// 1. Repair a duplicated scheme
/// 2. Cut everything from the first `/ref=` tracking segment
/// 3. Remove the query string and fragment
/// 4. Resolve relative links against `base_url`
/// 5. Reject non-HTTP(S) links and links that are not product pages
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `base_url` - The site origin used to resolve relative links
///
/// # Returns
///
/// * `Ok(String)` - Absolute product URL, usable as a deduplication key
/// * `Err(UrlError)` - The link cannot be turned into a product URL
///
/// # Examples
///
/// ```
/// use product_scrape::url::normalize_product_url;
/// use url::Url;
///
/// let base = Url::parse("https://www.amazon.in").unwrap();
/// let url = normalize_product_url("/Phone-X/dp/B0C1/ref=sr_1_1?keywords=mobile", &base).unwrap();
/// assert_eq!(url, "https://www.amazon.in/Phone-X/dp/B0C1");
/// ```
pub fn normalize_product_url(href: &str, base_url: &Url) -> Result<String, UrlError> {
    let href = href.trim();
    if href.is_empty() {
        return Err(UrlError::Parse("empty link".to_string()));
    }

    let repaired = repair_url(href);
    let mut cleaned = repaired.as_str();

    if let Some(pos) = cleaned.find(TRACKING_SEGMENT) {
        cleaned = &cleaned[..pos];
    }
    if let Some(pos) = cleaned.find(|c: char| c == '?' || c == '#') {
        cleaned = &cleaned[..pos];
    }

    let url = base_url
        .join(cleaned)
        .map_err(|e| UrlError::Parse(format!("{}: {}", cleaned, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    if !url.path().contains(PRODUCT_PATH_MARKER) {
        return Err(UrlError::NotAProduct(url.to_string()));
    }

    Ok(url.to_string())
}
