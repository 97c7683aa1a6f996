use crate::UrlError;
use url::Url;

/// Query parameters added by mailing lists and social sites
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "mc_cid"];

/// Normalizes a URL into the form used for deduplication and fetching
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not `http` or `https`
/// 3. Require a host (the parser already lowercases it)
/// 4. Remove fragment (everything after #)
/// 5. Remove tracking query parameters (`utm_*`, `fbclid`, `gclid`, ...)
/// 6. Remove empty query string (trailing ?)
///
/// Path and remaining query order are left alone: news sites routinely
/// distinguish `/story/` from `/story`. The result is a fixed point, so
/// normalizing an already-normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use disaster_crawl::url::normalize_url;
///
/// let url = normalize_url("https://WWW.EXAMPLE.COM/quake?utm_source=rss#top").unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/quake");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    if url.query().is_some() {
        strip_tracking_params(&mut url);
    }

    Ok(url)
}

/// Rewrites the query without tracking parameters, leaving it untouched otherwise
fn strip_tracking_params(url: &mut Url) {
    let has_tracking = url.query_pairs().any(|(key, _)| is_tracking_param(&key));

    if has_tracking {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    } else if url.query() == Some("") {
        url.set_query(None);
    }
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_scheme() {
        let result = normalize_url("http://example.com/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_lowercase_domain() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_remove_tracking_params() {
        let result = normalize_url("https://example.com/page?utm_source=twitter").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_mixed_query_params() {
        let result = normalize_url(
            "https://example.com/page?keep=yes&utm_medium=email&another=value&fbclid=123",
        )
        .unwrap();
        assert_eq!(
            result.as_str(),
            "https://example.com/page?keep=yes&another=value"
        );
    }

    #[test]
    fn test_query_without_tracking_untouched() {
        let result = normalize_url("https://example.com/search?q=flood%20warning&b=2").unwrap();
        assert_eq!(
            result.as_str(),
            "https://example.com/search?q=flood%20warning&b=2"
        );
    }

    #[test]
    fn test_empty_query_removed() {
        let result = normalize_url("https://example.com/page?").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_dot_segments_resolved() {
        let result = normalize_url("https://example.com/a/../b/./c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_trailing_slash_kept() {
        let result = normalize_url("https://example.com/story/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/story/");
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "https://example.com/a?b=c+d&utm_source=x#frag",
            "http://Example.com:8080/x/../y?",
            "https://example.com/search?q=flood%20warning",
        ] {
            let once = normalize_url(input).unwrap();
            let twice = normalize_url(once.as_str()).unwrap();
            assert_eq!(once, twice, "normalization not idempotent for {}", input);
        }
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_javascript_scheme() {
        let result = normalize_url("javascript:void(0)");
        assert!(matches!(result, Err(UrlError::InvalidScheme(_))));
    }

    #[test]
    fn test_malformed_url() {
        let result = normalize_url("not a url");
        assert!(matches!(result, Err(UrlError::Parse(_))));
    }
}
