/// Checks if a domain matches an allowed-domain pattern
///
/// Two kinds of patterns are supported:
/// 1. Plain: "cnn.com" matches "cnn.com" and any subdomain such as
///    "edition.cnn.com", the way news sites spread articles over hosts
/// 2. Wildcard: "*.cnn.com" behaves the same; the prefix is accepted so
///    that existing domain lists can be reused verbatim
///
/// # Examples
///
/// ```
/// use disaster_crawl::url::matches_domain;
///
/// assert!(matches_domain("cnn.com", "cnn.com"));
/// assert!(matches_domain("cnn.com", "edition.cnn.com"));
/// assert!(matches_domain("*.bbc.com", "www.bbc.com"));
/// assert!(!matches_domain("cnn.com", "notcnn.com"));
/// ```
pub fn matches_domain(pattern: &str, candidate: &str) -> bool {
    let base = pattern.strip_prefix("*.").unwrap_or(pattern);
    if base.is_empty() {
        return false;
    }

    candidate == base
        || candidate
            .strip_suffix(base)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
