/// Crawl task definitions
///
/// A task is created when a URL is scheduled and lives until it completes or
/// fails terminally. Only `attempt` changes after creation, through retries.
use crate::crawler::FetchOptions;
use std::fmt;
use std::time::Duration;
use url::Url;

/// The processing stage a task is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Seed feed or listing page whose entries are article links
    Discover,

    /// Entry link that must be resolved to its canonical URL
    Canonicalize,

    /// Canonical article page (or a link expanded from one)
    ExtractArticle,
}

impl Stage {
    /// Short label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discover => "discover",
            Self::Canonicalize => "canonicalize",
            Self::ExtractArticle => "extract_article",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL scheduled for one stage of the crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,

    /// Title carried over from the feed entry, if any
    pub title: Option<String>,

    /// Link hops from the article accepted into the crawl
    pub depth: u32,

    /// Failed fetch attempts so far
    pub attempt: u32,

    pub stage: Stage,

    /// Ask the fetch gateway to render the page and let it settle
    pub render: bool,
}

impl CrawlTask {
    /// Seed feed task
    pub fn seed(url: Url) -> Self {
        Self {
            url,
            title: None,
            depth: 0,
            attempt: 0,
            stage: Stage::Discover,
            render: false,
        }
    }

    /// Feed entry awaiting canonicalization
    pub fn entry(url: Url, title: String) -> Self {
        Self {
            url,
            title: Some(title),
            depth: 0,
            attempt: 0,
            stage: Stage::Canonicalize,
            render: false,
        }
    }

    /// Canonical article continuing this task's lineage at the same depth
    pub fn canonical_article(&self, url: Url) -> Self {
        Self {
            url,
            title: self.title.clone(),
            depth: self.depth,
            attempt: 0,
            stage: Stage::ExtractArticle,
            render: true,
        }
    }

    /// Article linked from this one, one hop deeper
    pub fn linked_article(&self, url: Url) -> Self {
        Self {
            url,
            title: None,
            depth: self.depth + 1,
            attempt: 0,
            stage: Stage::ExtractArticle,
            render: false,
        }
    }

    /// Identical task with the attempt counter advanced
    pub fn next_attempt(&self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self.clone()
        }
    }

    /// Fetch options for this task
    pub fn fetch_options(&self, settle_delay: Duration) -> FetchOptions {
        if self.render {
            FetchOptions {
                render_js: true,
                settle_delay,
            }
        } else {
            FetchOptions::default()
        }
    }
}
