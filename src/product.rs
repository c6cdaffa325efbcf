//! Product record produced for every successfully extracted product page

use serde::Serialize;

/// Placeholder for a field that could not be determined
pub const NOT_AVAILABLE: &str = "N/A";

/// Availability assumed when the page does not state one
pub const DEFAULT_AVAILABILITY: &str = "In Stock";

/// Marker appended to text cut at its display length
pub const ELLIPSIS: &str = "...";

/// One scraped product
///
/// Field order is the export column order. `url` is the deduplication key
/// for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRecord {
    pub title: String,
    pub price: String,
    pub rating: String,
    pub reviews: String,
    pub availability: String,
    pub description: String,
    pub url: String,
}

impl ProductRecord {
    /// Column names in export order
    pub const FIELDS: [&'static str; 7] = [
        "title",
        "price",
        "rating",
        "reviews",
        "availability",
        "description",
        "url",
    ];

    /// Returns the field values in export order
    pub fn to_row(&self) -> [&str; 7] {
        [
            &self.title,
            &self.price,
            &self.rating,
            &self.reviews,
            &self.availability,
            &self.description,
            &self.url,
        ]
    }
}

/// Cuts `text` to at most `max_chars` characters, appending [`ELLIPSIS`]
/// when anything was removed.
///
/// Counts characters rather than bytes so multi-byte text never splits
/// inside a code point.
///
/// ```
/// use product_scrape::product::truncate_display;
///
/// assert_eq!(truncate_display("abcdef", 3), "abc...");
/// assert_eq!(truncate_display("abc", 3), "abc");
/// ```
pub fn truncate_display(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProductRecord {
        ProductRecord {
            title: "Phone".to_string(),
            price: "₹9,999".to_string(),
            rating: "4.1".to_string(),
            reviews: "1234".to_string(),
            availability: DEFAULT_AVAILABILITY.to_string(),
            description: NOT_AVAILABLE.to_string(),
            url: "https://shop.example.com/dp/B001".to_string(),
        }
    }

    #[test]
    fn test_row_matches_field_order() {
        let record = sample();
        let row = record.to_row();
        assert_eq!(row.len(), ProductRecord::FIELDS.len());
        assert_eq!(row[0], "Phone");
        assert_eq!(row[1], "₹9,999");
        assert_eq!(row[6], "https://shop.example.com/dp/B001");
    }

    #[test]
    fn test_truncate_long_text() {
        let title = "x".repeat(100);
        let truncated = truncate_display(&title, 80);
        assert_eq!(truncated, format!("{}...", "x".repeat(80)));
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        let title = "y".repeat(50);
        assert_eq!(truncate_display(&title, 80), title);
    }

    #[test]
    fn test_truncate_exact_length_unchanged() {
        let title = "z".repeat(80);
        assert_eq!(truncate_display(&title, 80), title);
    }

    #[test]
    fn test_truncate_counts_characters() {
        let text = "₹".repeat(5);
        assert_eq!(truncate_display(&text, 2), "₹₹...");
    }
}
