//! HTML extraction for canonical links, article fields and hyperlinks
//!
//! Each field is described by an ordered list of rules; the first rule that
//! yields a non-empty value wins. The controller only sees the `Extractor`
//! trait, so the selectors here can change without touching crawl logic.

use crate::crawler::feed::{parse_feed, FeedItem};
use scraper::{Html, Selector};

/// Fields pulled out of an article page; `None` means no rule matched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFields {
    pub title: Option<String>,

    /// Body text, whitespace-joined; empty when nothing matched
    pub content: String,
    pub published_date: Option<String>,
    pub author: Option<String>,
    pub source: Option<String>,

    /// Raw `href` values of every anchor, in document order
    pub links: Vec<String>,
}

/// Capability the controller extracts page data through
pub trait Extractor: Send + Sync {
    /// Title and link pairs from a feed or listing page
    fn feed_items(&self, body: &str) -> Vec<FeedItem>;

    /// Raw `href` of the page's canonical link, if declared
    fn canonical_href(&self, body: &str) -> Option<String>;

    /// Article title, body text, metadata and outgoing links
    fn article(&self, body: &str) -> ArticleFields;
}

/// One way of locating a field value
#[derive(Debug, Clone, Copy)]
enum FieldRule {
    /// `content` attribute of the first matching `<meta>`
    Meta(&'static str),
    /// Text of the first matching element
    Text(&'static str),
    /// All text nodes below every matching element, joined
    AllText(&'static str),
}

const TITLE_RULES: &[FieldRule] = &[
    FieldRule::Meta(r#"meta[property="og:title"]"#),
    FieldRule::Text("title"),
];

const CONTENT_RULES: &[FieldRule] = &[
    FieldRule::AllText("p"),
    FieldRule::AllText(r#"div[class*="article"]"#),
];

const PUBLISHED_RULES: &[FieldRule] =
    &[FieldRule::Meta(r#"meta[property="article:published_time"]"#)];

const AUTHOR_RULES: &[FieldRule] = &[FieldRule::Meta(r#"meta[name="author"]"#)];

const SOURCE_RULES: &[FieldRule] = &[FieldRule::Meta(r#"meta[property="og:site_name"]"#)];

const CANONICAL_SELECTOR: &str = r#"link[rel="canonical"][href]"#;

const LINK_SELECTOR: &str = "a[href]";

/// Selector-based extractor for news pages
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for HtmlExtractor {
    fn feed_items(&self, body: &str) -> Vec<FeedItem> {
        parse_feed(body)
    }

    fn canonical_href(&self, body: &str) -> Option<String> {
        let document = Html::parse_document(body);
        let selector = Selector::parse(CANONICAL_SELECTOR).ok()?;

        document
            .select(&selector)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .find(|href| !href.is_empty())
            .map(str::to_string)
    }

    fn article(&self, body: &str) -> ArticleFields {
        let document = Html::parse_document(body);

        ArticleFields {
            title: first_match(&document, TITLE_RULES),
            content: first_match(&document, CONTENT_RULES).unwrap_or_default(),
            published_date: first_match(&document, PUBLISHED_RULES),
            author: first_match(&document, AUTHOR_RULES),
            source: first_match(&document, SOURCE_RULES),
            links: extract_hrefs(&document),
        }
    }
}

/// Applies rules in order and returns the first non-empty value
fn first_match(document: &Html, rules: &[FieldRule]) -> Option<String> {
    rules.iter().find_map(|rule| apply_rule(document, *rule))
}

fn apply_rule(document: &Html, rule: FieldRule) -> Option<String> {
    let value = match rule {
        FieldRule::Meta(css) => {
            let selector = Selector::parse(css).ok()?;
            document
                .select(&selector)
                .find_map(|element| element.value().attr("content"))
                .map(|content| content.trim().to_string())
        }
        FieldRule::Text(css) => {
            let selector = Selector::parse(css).ok()?;
            document
                .select(&selector)
                .next()
                .map(|element| join_text(element.text()))
        }
        FieldRule::AllText(css) => {
            let selector = Selector::parse(css).ok()?;
            Some(join_text(
                document.select(&selector).flat_map(|element| element.text()),
            ))
        }
    };

    value.filter(|v| !v.is_empty())
}

/// Joins text nodes with single spaces, skipping whitespace-only nodes
fn join_text<'a>(nodes: impl Iterator<Item = &'a str>) -> String {
    nodes
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_hrefs(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse(LINK_SELECTOR) else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_string)
        .collect()
}
