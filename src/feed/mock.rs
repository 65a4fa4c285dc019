//! Mock feed sources for testing
//!
//! Provides in-memory feed sources for:
//! - Unit tests without network calls
//! - Integration tests with controlled failures and latency
//! - Offline demo runs

use super::{FeedSource, NewsItem};
use crate::error::{Result, SentimentError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Returns a fixed list of items
pub struct StaticFeedSource {
    name: String,
    items: Vec<NewsItem>,
    calls: AtomicUsize,
}

impl StaticFeedSource {
    pub fn new(name: &str, items: Vec<NewsItem>) -> Self {
        Self {
            name: name.to_string(),
            items,
            calls: AtomicUsize::new(0),
        }
    }

    /// Build from headlines only; summaries are left empty
    pub fn from_headlines(name: &str, headlines: &[&str]) -> Self {
        let items = headlines
            .iter()
            .map(|h| NewsItem::new(name, h, ""))
            .collect();
        Self::new(name, items)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of times `fetch` was called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for StaticFeedSource {
    async fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.iter().take(limit).cloned().collect())
    }
}

/// Always fails with `SourceUnavailable`
pub struct FailingFeedSource {
    name: String,
    reason: String,
}

impl FailingFeedSource {
    pub fn new(name: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl FeedSource for FailingFeedSource {
    async fn fetch(&self, _limit: usize) -> Result<Vec<NewsItem>> {
        Err(SentimentError::SourceUnavailable {
            source_name: self.name.clone(),
            reason: self.reason.clone(),
        })
    }
}

/// Responds only after a delay; used to exercise fetch timeouts
pub struct SlowFeedSource {
    delay: Duration,
    inner: StaticFeedSource,
}

impl SlowFeedSource {
    pub fn new(delay: Duration, inner: StaticFeedSource) -> Self {
        Self { delay, inner }
    }
}

#[async_trait]
impl FeedSource for SlowFeedSource {
    async fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch(limit).await
    }
}

/// Canned headlines for offline demo runs
pub fn demo_headlines() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (
            "Demo Markets",
            vec![
                "Apple beats earnings estimates as iPhone sales surge",
                "Microsoft shares rise after strong cloud growth",
                "Nvidia posts record revenue on soaring GPU demand",
                "JPMorgan warns of weaker trading revenue",
                "Goldman Sachs cuts jobs amid slowdown",
                "BP profit falls as oil prices slump",
            ],
        ),
        (
            "Demo Tech",
            vec![
                "Zoom faces user decline amid competition",
                "Salesforce sees massive growth in enterprise adoption",
                "Snowflake stock plunges after weak guidance",
                "Datadog expands partnership, shares gain",
                "Coinbase hit by outage and lawsuit",
                "Spotify reports strong subscriber growth",
            ],
        ),
    ]
}
