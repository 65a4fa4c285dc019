//! Reporting insights
//!
//! Data-only views over a run's summaries: market mood, sector averages,
//! top movers, source volume and the score distribution. Entities without
//! evidence are left out of every average.

#[cfg(test)]
mod tests;

use crate::aggregate::{EntitySummary, ScoredItem};
use crate::error::Result;
use crate::price::{cumulative_return, daily_returns, PriceHistory};
use crate::registry::Category;
use crate::sentiment::SentimentLabel;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Write;

/// Entities shown in the movers list
pub const TOP_MOVERS: usize = 10;

/// Headline numbers for one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityScore {
    pub entity_id: String,
    pub category: Category,
    pub avg_sentiment: f64,
    pub article_count: usize,
}

impl From<&EntitySummary> for EntityScore {
    fn from(s: &EntitySummary) -> Self {
        Self {
            entity_id: s.entity_id.clone(),
            category: s.category,
            avg_sentiment: s.avg_sentiment,
            article_count: s.article_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketSentiment {
    pub score: f64,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorComparison {
    pub stock: Option<f64>,
    pub saas: Option<f64>,
}

/// Statistics over every article score of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
}

/// Price movement next to an entity's sentiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceContext {
    pub entity_id: String,
    pub avg_sentiment: f64,
    pub latest_close: f64,
    /// Percent
    pub cumulative_return: f64,
    /// Percent, one per consecutive pair of closes
    pub daily_returns: Vec<f64>,
}

/// Everything the console report shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub market: Option<MarketSentiment>,
    pub sectors: SectorComparison,
    pub top_movers: Vec<EntityScore>,
    pub stock_ranking: Vec<EntityScore>,
    pub saas_ranking: Vec<EntityScore>,
    pub source_volume: Vec<(String, usize)>,
    pub distribution: Option<Distribution>,
    pub most_positive_stock: Option<EntityScore>,
    pub most_negative_stock: Option<EntityScore>,
    pub most_positive_saas: Option<EntityScore>,
    pub most_negative_saas: Option<EntityScore>,
    pub most_covered: Option<EntityScore>,
    pub total_articles: usize,
}

impl Insights {
    pub fn from_summaries(summaries: &[EntitySummary]) -> Self {
        Self {
            market: market_sentiment(summaries),
            sectors: sector_comparison(summaries),
            top_movers: top_movers(summaries, TOP_MOVERS),
            stock_ranking: ranking(summaries, Category::Stock),
            saas_ranking: ranking(summaries, Category::Saas),
            source_volume: source_volume(summaries),
            distribution: distribution(summaries),
            most_positive_stock: most_positive(summaries, Some(Category::Stock)),
            most_negative_stock: most_negative(summaries, Some(Category::Stock)),
            most_positive_saas: most_positive(summaries, Some(Category::Saas)),
            most_negative_saas: most_negative(summaries, Some(Category::Saas)),
            most_covered: most_covered(summaries),
            total_articles: total_articles(summaries),
        }
    }
}

fn with_evidence(summaries: &[EntitySummary]) -> impl Iterator<Item = &EntitySummary> {
    summaries.iter().filter(|s| s.has_evidence())
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

fn by_score(a: &EntitySummary, b: &EntitySummary) -> Ordering {
    a.avg_sentiment
        .partial_cmp(&b.avg_sentiment)
        .unwrap_or(Ordering::Equal)
}

/// Mean entity score across the run
pub fn market_sentiment(summaries: &[EntitySummary]) -> Option<MarketSentiment> {
    mean(with_evidence(summaries).map(|s| s.avg_sentiment)).map(|score| MarketSentiment {
        score,
        label: SentimentLabel::classify(score),
    })
}

pub fn sector_comparison(summaries: &[EntitySummary]) -> SectorComparison {
    let sector = |category: Category| {
        mean(
            with_evidence(summaries)
                .filter(|s| s.category == category)
                .map(|s| s.avg_sentiment),
        )
    };
    SectorComparison {
        stock: sector(Category::Stock),
        saas: sector(Category::Saas),
    }
}

/// Strongest opinions first, by absolute score
pub fn top_movers(summaries: &[EntitySummary], n: usize) -> Vec<EntityScore> {
    let mut movers: Vec<&EntitySummary> = with_evidence(summaries).collect();
    movers.sort_by(|a, b| {
        b.avg_sentiment
            .abs()
            .partial_cmp(&a.avg_sentiment.abs())
            .unwrap_or(Ordering::Equal)
    });
    movers.into_iter().take(n).map(EntityScore::from).collect()
}

/// Entities of one category with evidence, most positive first
pub fn ranking(summaries: &[EntitySummary], category: Category) -> Vec<EntityScore> {
    let mut ranked: Vec<&EntitySummary> = with_evidence(summaries)
        .filter(|s| s.category == category)
        .collect();
    ranked.sort_by(|a, b| by_score(b, a));
    ranked.into_iter().map(EntityScore::from).collect()
}

/// Article count per source, busiest first; ties by name
pub fn source_volume(summaries: &[EntitySummary]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in summaries.iter().flat_map(|s| &s.evidence) {
        *counts.entry(item.source_id()).or_default() += 1;
    }

    let mut volume: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(source, n)| (source.to_string(), n))
        .collect();
    volume.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    volume
}

pub fn distribution(summaries: &[EntitySummary]) -> Option<Distribution> {
    let mut scores: Vec<f64> = summaries
        .iter()
        .flat_map(|s| s.evidence.iter().map(|e| e.score.overall))
        .collect();
    if scores.is_empty() {
        return None;
    }
    scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n = scores.len();
    let median = if n % 2 == 0 {
        (scores[n / 2 - 1] + scores[n / 2]) / 2.0
    } else {
        scores[n / 2]
    };

    Some(Distribution {
        count: n,
        mean: scores.iter().sum::<f64>() / n as f64,
        median,
        min: scores[0],
        max: scores[n - 1],
    })
}

/// Highest-scoring entity with evidence, optionally within one category
pub fn most_positive(summaries: &[EntitySummary], category: Option<Category>) -> Option<EntityScore> {
    with_evidence(summaries)
        .filter(|s| category.map_or(true, |c| s.category == c))
        .max_by(|a, b| by_score(a, b))
        .map(EntityScore::from)
}

pub fn most_negative(summaries: &[EntitySummary], category: Option<Category>) -> Option<EntityScore> {
    with_evidence(summaries)
        .filter(|s| category.map_or(true, |c| s.category == c))
        .min_by(|a, b| by_score(a, b))
        .map(EntityScore::from)
}

/// Entity with the most articles; the earliest wins a tie
pub fn most_covered(summaries: &[EntitySummary]) -> Option<EntityScore> {
    let mut best: Option<&EntitySummary> = None;
    for s in with_evidence(summaries) {
        if best.map_or(true, |b| s.article_count > b.article_count) {
            best = Some(s);
        }
    }
    best.map(EntityScore::from)
}

pub fn total_articles(summaries: &[EntitySummary]) -> usize {
    summaries.iter().map(|s| s.article_count).sum()
}

/// Article drill-down: strongest evidence first, without touching the summary
pub fn top_evidence(summary: &EntitySummary, n: usize) -> Vec<&ScoredItem> {
    summary.top_evidence(n)
}

/// Latest close and returns over the lookback window ending at `end`.
/// `None` for SaaS entities and for symbols without a series.
pub async fn price_context(
    summary: &EntitySummary,
    history: &dyn PriceHistory,
    end: NaiveDate,
    lookback_days: i64,
) -> Result<Option<PriceContext>> {
    if summary.category != Category::Stock {
        return Ok(None);
    }

    let start = end - Duration::days(lookback_days.max(1));
    let bars = match history.history(&summary.entity_id, start, end).await? {
        Some(bars) => bars,
        None => return Ok(None),
    };
    let latest = match bars.last() {
        Some(bar) => bar.close,
        None => return Ok(None),
    };

    Ok(Some(PriceContext {
        entity_id: summary.entity_id.clone(),
        avg_sentiment: summary.avg_sentiment,
        latest_close: latest,
        cumulative_return: cumulative_return(&bars).unwrap_or(0.0),
        daily_returns: daily_returns(&bars),
    }))
}

fn score_line(label: &str, score: &Option<EntityScore>) -> String {
    match score {
        Some(s) => format!("{:<26}{} ({:.3})\n", label, s.entity_id, s.avg_sentiment),
        None => format!("{:<26}n/a\n", label),
    }
}

fn sector_value(v: Option<f64>) -> String {
    v.map_or_else(|| "n/a".to_string(), |v| format!("{:.3}", v))
}

/// Console rendering of the insights
pub fn render_text(insights: &Insights) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);

    let _ = writeln!(out, "{}", rule);
    match &insights.market {
        Some(m) => {
            let _ = writeln!(out, "Overall Market Sentiment: {:.3} ({})", m.score, m.label);
        }
        None => {
            let _ = writeln!(out, "Overall Market Sentiment: no data");
        }
    }
    let _ = writeln!(out, "{}", rule);

    for (title, ranked) in [
        ("Stock Sentiment", &insights.stock_ranking),
        ("SaaS Sentiment", &insights.saas_ranking),
    ] {
        let _ = writeln!(out, "\n{}", title);
        let _ = writeln!(out, "{}", "-".repeat(40));
        if ranked.is_empty() {
            let _ = writeln!(out, "  No data available");
        }
        for s in ranked {
            let _ = writeln!(
                out,
                "  {:<8} {:>7.3}  {:<14} {:>3} articles",
                s.entity_id,
                s.avg_sentiment,
                SentimentLabel::classify(s.avg_sentiment),
                s.article_count
            );
        }
    }

    if !insights.top_movers.is_empty() {
        let _ = writeln!(out, "\nTop Sentiment Movers");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for s in &insights.top_movers {
            let _ = writeln!(out, "  {:<8} {:>7.3}", s.entity_id, s.avg_sentiment);
        }
    }

    if !insights.source_volume.is_empty() {
        let total: usize = insights.source_volume.iter().map(|(_, n)| n).sum();
        let _ = writeln!(out, "\nNews by Source");
        let _ = writeln!(out, "{}", "-".repeat(40));
        for (source, n) in &insights.source_volume {
            let _ = writeln!(
                out,
                "  {:<24} {:>4} ({:.1}%)",
                source,
                n,
                *n as f64 / total as f64 * 100.0
            );
        }
    }

    if let Some(d) = &insights.distribution {
        let _ = writeln!(out, "\nScore Distribution");
        let _ = writeln!(out, "{}", "-".repeat(40));
        let _ = writeln!(
            out,
            "  n={}  mean={:.3}  median={:.3}  min={:.3}  max={:.3}",
            d.count, d.mean, d.median, d.min, d.max
        );
    }

    let _ = writeln!(out, "\nKey Insights");
    let _ = writeln!(out, "{}", "-".repeat(40));
    out.push_str(&score_line("Most Positive Stock", &insights.most_positive_stock));
    out.push_str(&score_line("Most Negative Stock", &insights.most_negative_stock));
    out.push_str(&score_line("Most Positive SaaS", &insights.most_positive_saas));
    out.push_str(&score_line("Most Negative SaaS", &insights.most_negative_saas));
    let _ = writeln!(
        out,
        "{:<26}Stocks: {} | SaaS: {}",
        "Sector Comparison",
        sector_value(insights.sectors.stock),
        sector_value(insights.sectors.saas)
    );
    let _ = writeln!(out, "{:<26}{}", "Total Articles Analysed", insights.total_articles);
    match &insights.most_covered {
        Some(s) => {
            let _ = writeln!(
                out,
                "{:<26}{} ({} articles)",
                "Most News Coverage", s.entity_id, s.article_count
            );
        }
        None => {
            let _ = writeln!(out, "{:<26}n/a", "Most News Coverage");
        }
    }

    out
}
