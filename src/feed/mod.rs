//! News feed ingestion
//!
//! Collects raw news items from named sources:
//! - Financial RSS feeds (stock category)
//! - Tech/SaaS RSS and Atom feeds (saas category)
//!
//! Sources are opaque providers; availability is their concern. Every call
//! goes through a per-source throttle and a timeout.

pub mod mock;
pub mod rss;
pub mod throttle;

#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::{Result, SentimentError};
use crate::registry::Category;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use throttle::Throttle;

/// Raw news item as fetched from a feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub published_at: Option<DateTime<Utc>>,
    /// Name of the source that produced the item
    pub source_id: String,
    pub link: String,
}

impl NewsItem {
    pub fn new(source_id: &str, title: &str, summary: &str) -> Self {
        Self {
            title: title.to_string(),
            summary: summary.to_string(),
            published_at: None,
            source_id: source_id.to_string(),
            link: String::new(),
        }
    }

    /// Text block that gets matched and scored
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.summary)
    }
}

/// Feed source trait
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch up to `limit` of the most recent items
    async fn fetch(&self, limit: usize) -> Result<Vec<NewsItem>>;
}

/// A source registered under a name and category
pub struct RegisteredSource {
    name: String,
    category: Category,
    throttle: Throttle,
    inner: Arc<dyn FeedSource>,
}

impl RegisteredSource {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Throttled, time-bounded fetch. Items are stamped with this source's name.
    pub async fn fetch(&self, limit: usize, timeout: Duration) -> Result<Vec<NewsItem>> {
        self.throttle.wait().await;

        let mut items = tokio::time::timeout(timeout, self.inner.fetch(limit))
            .await
            .map_err(|_| SentimentError::Timeout {
                source_name: self.name.clone(),
                after: timeout,
            })??;

        items.truncate(limit);
        for item in &mut items {
            if item.source_id != self.name {
                item.source_id = self.name.clone();
            }
        }
        Ok(items)
    }
}

/// Named feed sources grouped by category
pub struct FeedSourceSet {
    sources: Vec<Arc<RegisteredSource>>,
    min_interval: Duration,
}

impl FeedSourceSet {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            sources: Vec::new(),
            min_interval,
        }
    }

    /// Build RSS sources for every configured feed
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = rss::http_client(config.pipeline.fetch_timeout())?;
        let mut set = Self::new(config.pipeline.min_source_interval());
        for feed in &config.feeds {
            let source = rss::RssFeedSource::new(&feed.name, &feed.url, http.clone());
            set.add(&feed.name, feed.category, Arc::new(source));
        }
        Ok(set)
    }

    pub fn add(&mut self, name: &str, category: Category, source: Arc<dyn FeedSource>) {
        self.sources.push(Arc::new(RegisteredSource {
            name: name.to_string(),
            category,
            throttle: Throttle::new(self.min_interval),
            inner: source,
        }));
    }

    /// Builder-style variant of `add`
    pub fn with_source(mut self, name: &str, category: Category, source: Arc<dyn FeedSource>) -> Self {
        self.add(name, category, source);
        self
    }

    /// Sources appropriate for an entity category, in registration order
    pub fn for_category(&self, category: Category) -> Vec<Arc<RegisteredSource>> {
        self.sources
            .iter()
            .filter(|s| s.category == category)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
