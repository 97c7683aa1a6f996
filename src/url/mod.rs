//! URL handling module for Disaster-Crawl
//!
//! This module provides URL normalization, link resolution, domain extraction
//! and the allowed-domain scope check applied to discovered URLs.

mod domain;
mod matcher;
mod normalize;
mod resolve;

// Re-export main functions
pub use domain::extract_domain;
pub use matcher::matches_domain;
pub use normalize::normalize_url;
pub use resolve::{is_http, resolve_link};

use url::Url;

/// The set of domains the crawl may leave its seeds for
///
/// An empty scope allows every domain.
#[derive(Debug, Clone, Default)]
pub struct DomainScope {
    patterns: Vec<String>,
}

impl DomainScope {
    /// Builds a scope from configured domain patterns
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// Returns true if the scope places no restriction
    pub fn is_unrestricted(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns true if the URL's host is inside the scope
    pub fn allows(&self, url: &Url) -> bool {
        if self.is_unrestricted() {
            return true;
        }

        match extract_domain(url) {
            Some(domain) => self.patterns.iter().any(|p| matches_domain(p, &domain)),
            None => false,
        }
    }
}
