//! RSS 2.0 / Atom feed source

use super::{FeedSource, NewsItem};
use crate::error::{Result, SentimentError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("news-sentiment/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client for all feed sources
pub fn http_client(timeout: Duration) -> Result<Client> {
    let client = Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Feed reachable over HTTP
pub struct RssFeedSource {
    name: String,
    url: String,
    http: Client,
}

impl RssFeedSource {
    pub fn new(name: &str, url: &str, http: Client) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            http,
        }
    }
}

#[async_trait]
impl FeedSource for RssFeedSource {
    async fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>> {
        debug!("Fetching {} from {}", self.name, self.url);

        let response = self.http.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SentimentError::SourceUnavailable {
                source_name: self.name.clone(),
                reason: format!("HTTP {}", status),
            });
        }

        let body = response.text().await?;
        let mut items = parse_feed(&body, &self.name)?;
        items.truncate(limit);
        Ok(items)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Title,
    Summary,
    Content,
    Link,
    Published,
}

#[derive(Default)]
struct Draft {
    title: String,
    summary: String,
    content: String,
    link: String,
    published: String,
}

impl Draft {
    fn push(&mut self, field: Field, text: &str) {
        let target = match field {
            Field::Title => &mut self.title,
            Field::Summary => &mut self.summary,
            Field::Content => &mut self.content,
            Field::Link => &mut self.link,
            Field::Published => &mut self.published,
        };
        target.push_str(text);
    }

    fn finish(self, source: &str) -> Option<NewsItem> {
        let title = strip_html(&self.title);
        let summary = if self.summary.trim().is_empty() {
            strip_html(&self.content)
        } else {
            strip_html(&self.summary)
        };
        if title.is_empty() && summary.is_empty() {
            return None;
        }
        Some(NewsItem {
            title,
            summary,
            published_at: parse_date(&self.published),
            source_id: source.to_string(),
            link: self.link.trim().to_string(),
        })
    }
}

fn field_for(local_name: &[u8]) -> Option<Field> {
    match local_name {
        b"title" => Some(Field::Title),
        b"description" | b"summary" => Some(Field::Summary),
        b"content" | b"encoded" => Some(Field::Content),
        b"link" => Some(Field::Link),
        b"pubDate" | b"published" | b"updated" | b"date" => Some(Field::Published),
        _ => None,
    }
}

/// Media RSS children (`media:content`, `media:title`) describe attachments, not the story
fn is_media(e: &BytesStart<'_>) -> bool {
    e.name().as_ref().starts_with(b"media:")
}

/// Atom links carry the url in `href`; only alternate (or unlabeled) links count
fn atom_href(e: &BytesStart<'_>) -> Option<String> {
    let mut href = None;
    let mut alternate = true;
    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"href" => href = attr.unescape_value().ok().map(|v| v.into_owned()),
            b"rel" => {
                alternate = attr
                    .unescape_value()
                    .map(|v| v == "alternate")
                    .unwrap_or(false)
            }
            _ => {}
        }
    }
    href.filter(|_| alternate)
}

/// Parse an RSS 2.0 or Atom document into news items, in document order
pub fn parse_feed(xml: &str, source: &str) -> Result<Vec<NewsItem>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut items = Vec::new();
    let mut draft: Option<Draft> = None;
    let mut field: Option<Field> = None;
    // Open elements below the current item; only direct children carry fields
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SentimentError::FeedParse(format!("{}: {}", source, e)))?;

        match event {
            Event::Start(e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"item" | b"entry" => {
                        draft = Some(Draft::default());
                        field = None;
                        depth = 0;
                    }
                    name => {
                        if let Some(d) = draft.as_mut() {
                            depth += 1;
                            if depth == 1 && !is_media(&e) {
                                if let Some(f) = field_for(name) {
                                    if f == Field::Link {
                                        if let Some(href) = atom_href(&e) {
                                            d.link = href;
                                        }
                                    }
                                    field = Some(f);
                                }
                            }
                        }
                    }
                }
            }
            Event::Empty(e) => {
                if let Some(d) = draft.as_mut() {
                    if depth == 0 && e.local_name().as_ref() == b"link" && d.link.is_empty() {
                        if let Some(href) = atom_href(&e) {
                            d.link = href;
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(d), Some(f)) = (draft.as_mut(), field) {
                    let text = t
                        .unescape()
                        .map_err(|e| SentimentError::FeedParse(format!("{}: {}", source, e)))?;
                    d.push(f, &text);
                }
            }
            Event::CData(c) => {
                if let (Some(d), Some(f)) = (draft.as_mut(), field) {
                    let raw = c.into_inner();
                    d.push(f, &String::from_utf8_lossy(&raw));
                }
            }
            Event::End(e) => {
                let local = e.local_name();
                match local.as_ref() {
                    b"item" | b"entry" => {
                        if let Some(item) = draft.take().and_then(|d| d.finish(source)) {
                            items.push(item);
                        }
                        field = None;
                    }
                    _ => {
                        if draft.is_some() {
                            if depth == 1 {
                                field = None;
                            }
                            depth = depth.saturating_sub(1);
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(items)
}

/// RFC 2822 (RSS) first, then RFC 3339 (Atom)
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Drop markup from feed text and collapse whitespace. A `<` that does not
/// open a tag (`S&P 500 < 4000`) is kept as text.
pub fn strip_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let opens_tag = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '/' || c == '!');
        match after.find('>') {
            Some(end) if opens_tag => {
                out.push(' ');
                rest = &after[end + 1..];
            }
            _ => {
                out.push('<');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    let decoded = out
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#8217;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");

    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
