use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use disaster_crawl::url::extract_domain;
///
/// let url = Url::parse("https://EDITION.CNN.COM/weather").unwrap();
/// assert_eq!(extract_domain(&url), Some("edition.cnn.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
