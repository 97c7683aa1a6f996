use url::Url;

/// Resolves an in-page href against the page URL
///
/// Returns None if the link should not be followed:
/// - `javascript`, `mailto` links
/// - fragment-only links (same page anchors)
/// - hrefs that do not resolve to an absolute HTTP(S) URL
///
/// # Examples
///
/// ```
/// use disaster_crawl::url::resolve_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/world/quake").unwrap();
/// assert_eq!(
///     resolve_link("../us/floods", &base).unwrap().as_str(),
///     "https://example.com/us/floods"
/// );
/// assert!(resolve_link("javascript:void(0)", &base).is_none());
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript") || lowered.starts_with("mailto") {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    if is_http(&absolute) {
        Some(absolute)
    } else {
        None
    }
}

/// True for `http` and `https` URLs
pub fn is_http(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}
