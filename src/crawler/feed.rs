//! RSS and Atom feed parsing for the discover stage

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One entry of a seed feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
}

/// Builder for the entry currently being read
#[derive(Debug, Default)]
struct PendingItem {
    title: String,
    link: String,
}

impl PendingItem {
    fn finish(self) -> Option<FeedItem> {
        let link = self.link.trim();
        if link.is_empty() {
            return None;
        }
        let title = self.title.trim();
        Some(FeedItem {
            title: (!title.is_empty()).then(|| title.to_string()),
            link: link.to_string(),
        })
    }
}

/// Extracts `<item>` (RSS) and `<entry>` (Atom) title/link pairs
///
/// Entries without a link are skipped. Malformed XML stops parsing and
/// returns the entries read up to that point.
pub fn parse_feed(body: &str) -> Vec<FeedItem> {
    let mut reader = Reader::from_str(body);
    reader.trim_text(true);

    let mut items = Vec::new();
    let mut pending: Option<PendingItem> = None;
    let mut field: Option<Field> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => pending = Some(PendingItem::default()),
                b"title" if pending.is_some() => field = Some(Field::Title),
                b"link" if pending.is_some() => {
                    field = Some(Field::Link);
                    if let Some(item) = pending.as_mut() {
                        take_atom_href(&e, item);
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"link" {
                    if let Some(item) = pending.as_mut() {
                        take_atom_href(&e, item);
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"item" | b"entry" => {
                    if let Some(item) = pending.take().and_then(PendingItem::finish) {
                        items.push(item);
                    }
                    field = None;
                }
                b"title" | b"link" => field = None,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let (Some(item), Some(f)) = (pending.as_mut(), field) {
                    match t.unescape() {
                        Ok(text) => push_text(item, f, &text),
                        Err(e) => tracing::debug!("Skipping undecodable feed text: {}", e),
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if let (Some(item), Some(f)) = (pending.as_mut(), field) {
                    push_text(item, f, &String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                tracing::warn!(
                    "Feed parse error at position {}: {}",
                    reader.buffer_position(),
                    e
                );
                break;
            }
            Ok(_) => {}
        }
        buf.clear();
    }

    items
}

fn push_text(item: &mut PendingItem, field: Field, text: &str) {
    match field {
        Field::Title => item.title.push_str(text),
        Field::Link if item.link.is_empty() => item.link.push_str(text),
        Field::Link => {}
    }
}

/// Atom links carry the URL in `href`; only alternate links point at the article
fn take_atom_href(element: &BytesStart<'_>, item: &mut PendingItem) {
    if !item.link.is_empty() {
        return;
    }

    let rel = element
        .try_get_attribute("rel")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
    if rel.as_deref().is_some_and(|r| r != "alternate") {
        return;
    }

    if let Some(href) = element
        .try_get_attribute("href")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    {
        item.link = href;
    }
}
