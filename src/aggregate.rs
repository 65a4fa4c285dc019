//! Entity-level aggregation
//!
//! Folds the scored items of one entity into an [`EntitySummary`]: mean of
//! `overall`, its label, the distinct sources and the evidence in scoring
//! order. Pure; no state is kept between calls.

use crate::matcher::MatchedItem;
use crate::registry::{Category, TrackedEntity};
use crate::sentiment::{SentimentLabel, SentimentScore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// A matched item with its fused score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub matched: MatchedItem,
    pub score: SentimentScore,
    pub computed_at: DateTime<Utc>,
    /// Set when the polarity model fell back to neutral for this item
    pub degraded_reason: Option<String>,
}

impl ScoredItem {
    pub fn source_id(&self) -> &str {
        &self.matched.item.source_id
    }

    pub fn title(&self) -> &str {
        &self.matched.item.title
    }
}

/// Terminal per-entity artifact of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySummary {
    pub entity_id: String,
    pub category: Category,
    pub article_count: usize,
    pub avg_sentiment: f64,
    pub label: SentimentLabel,
    pub sources: BTreeSet<String>,
    /// Insertion (scoring) order; never re-sorted
    pub evidence: Vec<ScoredItem>,
}

impl EntitySummary {
    pub fn has_evidence(&self) -> bool {
        !self.evidence.is_empty()
    }

    /// Strongest evidence first, by absolute `overall`; ties keep scoring order
    pub fn top_evidence(&self, n: usize) -> Vec<&ScoredItem> {
        let mut ranked: Vec<&ScoredItem> = self.evidence.iter().collect();
        ranked.sort_by(|a, b| {
            b.score
                .overall
                .abs()
                .partial_cmp(&a.score.overall.abs())
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(n);
        ranked
    }

    /// Newest evidence first; undated items go last
    pub fn most_recent(&self, n: usize) -> Vec<&ScoredItem> {
        let mut ranked: Vec<&ScoredItem> = self.evidence.iter().collect();
        ranked.sort_by(|a, b| b.matched.item.published_at.cmp(&a.matched.item.published_at));
        ranked.truncate(n);
        ranked
    }

    /// Number of evidence items whose polarity score was degraded
    pub fn degraded_count(&self) -> usize {
        self.evidence
            .iter()
            .filter(|s| s.degraded_reason.is_some())
            .count()
    }
}

/// Build the summary for one entity
pub fn aggregate(entity: &TrackedEntity, scored_items: Vec<ScoredItem>) -> EntitySummary {
    let article_count = scored_items.len();

    let avg_sentiment = if article_count == 0 {
        0.0
    } else {
        scored_items.iter().map(|s| s.score.overall).sum::<f64>() / article_count as f64
    };

    let sources = scored_items
        .iter()
        .map(|s| s.source_id().to_string())
        .collect();

    EntitySummary {
        entity_id: entity.id().to_string(),
        category: entity.category(),
        article_count,
        avg_sentiment,
        label: SentimentLabel::classify(avg_sentiment),
        sources,
        evidence: scored_items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::NewsItem;
    use chrono::TimeZone;

    fn entity() -> TrackedEntity {
        TrackedEntity::new("AAPL", Category::Stock, ["apple"]).unwrap()
    }

    fn scored(source: &str, title: &str, overall: f64) -> ScoredItem {
        let mut score = SentimentScore::neutral();
        score.overall = overall;
        ScoredItem {
            matched: MatchedItem {
                item: NewsItem::new(source, title, ""),
                entity_id: "AAPL".to_string(),
            },
            score,
            computed_at: Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap(),
            degraded_reason: None,
        }
    }

    #[test]
    fn test_empty_evidence() {
        let summary = aggregate(&entity(), Vec::new());
        assert_eq!(summary.article_count, 0);
        assert_eq!(summary.avg_sentiment, 0.0);
        assert_eq!(summary.label, SentimentLabel::Neutral);
        assert!(summary.sources.is_empty());
        assert!(!summary.has_evidence());
        assert_eq!(summary.entity_id, "AAPL");
        assert_eq!(summary.category, Category::Stock);
    }

    #[test]
    fn test_mean_and_label() {
        let items = vec![
            scored("Yahoo", "a", 0.5),
            scored("Reuters", "b", 0.3),
            scored("Yahoo", "c", -0.2),
        ];
        let summary = aggregate(&entity(), items);
        assert_eq!(summary.article_count, 3);
        assert!((summary.avg_sentiment - 0.2).abs() < 1e-9);
        assert_eq!(summary.label, SentimentLabel::Positive);
        assert_eq!(summary.sources.len(), 2);
        assert!(summary.sources.contains("Yahoo"));
    }

    #[test]
    fn test_evidence_keeps_insertion_order() {
        let items = vec![
            scored("s", "first", -0.1),
            scored("s", "second", 0.9),
            scored("s", "third", 0.0),
        ];
        let summary = aggregate(&entity(), items);
        let titles: Vec<&str> = summary.evidence.iter().map(|s| s.title()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_idempotent() {
        let items = vec![scored("s", "a", 0.4), scored("t", "b", -0.7)];
        let first = aggregate(&entity(), items.clone());
        let second = aggregate(&entity(), items);
        assert_eq!(first, second);
    }

    #[test]
    fn test_top_evidence_by_magnitude() {
        let items = vec![
            scored("s", "mild", 0.1),
            scored("s", "very bad", -0.8),
            scored("s", "good", 0.5),
        ];
        let summary = aggregate(&entity(), items);
        let top: Vec<&str> = summary.top_evidence(2).iter().map(|s| s.title()).collect();
        assert_eq!(top, vec!["very bad", "good"]);
        // Ranking does not touch the stored order
        assert_eq!(summary.evidence[0].title(), "mild");
    }

    #[test]
    fn test_most_recent() {
        let mut old = scored("s", "old", 0.1);
        old.matched.item.published_at = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let mut new = scored("s", "new", 0.1);
        new.matched.item.published_at = Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        let undated = scored("s", "undated", 0.1);

        let summary = aggregate(&entity(), vec![undated, old, new]);
        let order: Vec<&str> = summary.most_recent(3).iter().map(|s| s.title()).collect();
        assert_eq!(order, vec!["new", "old", "undated"]);
    }

    #[test]
    fn test_degraded_count() {
        let mut item = scored("s", "a", 0.2);
        item.degraded_reason = Some("malformed input".to_string());
        let summary = aggregate(&entity(), vec![item, scored("s", "b", 0.1)]);
        assert_eq!(summary.degraded_count(), 1);
    }
}
