//! Utility functions and helpers.

pub mod log;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-insensitive substring test against a list of tokens.
///
/// `haystack` must already be lower-cased; blank tokens never match.
pub fn contains_any(haystack: &str, tokens: &[String]) -> bool {
    tokens
        .iter()
        .map(|t| t.trim().to_lowercase())
        .any(|t| !t.is_empty() && haystack.contains(&t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        let base = Url::parse("https://www.olx.ua/uk/list/q-canon-ixus/?page=2").unwrap();
        assert_eq!(
            resolve_url(&base, "/d/uk/obyavlenie/canon-ixus-IDabc.html"),
            "https://www.olx.ua/d/uk/obyavlenie/canon-ixus-IDabc.html"
        );
        assert_eq!(
            resolve_url(&base, "https://other.com/x"),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  Canon\n  IXUS\t135 "), "Canon IXUS 135");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_contains_any() {
        let tokens = vec!["IXUS".to_string(), " ".to_string()];
        assert!(contains_any("canon ixus 105", &tokens));
        assert!(!contains_any("nikon coolpix", &tokens));
    }
}
