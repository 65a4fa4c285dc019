//! Tests for reporting insights

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::aggregate::aggregate;
    use crate::feed::NewsItem;
    use crate::matcher::MatchedItem;
    use crate::price::StaticPriceHistory;
    use crate::registry::TrackedEntity;
    use crate::sentiment::SentimentScore;
    use chrono::Utc;

    fn summary(id: &str, category: Category, scores: &[(&str, f64)]) -> EntitySummary {
        let entity = TrackedEntity::new(id, category, Vec::<String>::new()).unwrap();
        let items = scores
            .iter()
            .enumerate()
            .map(|(i, (source, overall))| {
                let mut score = SentimentScore::neutral();
                score.overall = *overall;
                ScoredItem {
                    matched: MatchedItem {
                        item: NewsItem::new(source, &format!("{} story {}", id, i), ""),
                        entity_id: id.to_string(),
                    },
                    score,
                    computed_at: Utc::now(),
                    degraded_reason: None,
                }
            })
            .collect();
        aggregate(&entity, items)
    }

    fn run() -> Vec<EntitySummary> {
        vec![
            summary("AAPL", Category::Stock, &[("Yahoo", 0.5), ("Reuters", 0.3)]),
            summary("TSLA", Category::Stock, &[("Yahoo", -0.6)]),
            summary("NFLX", Category::Stock, &[]),
            summary("CRM", Category::Saas, &[("TechCrunch", 0.2), ("TechCrunch", 0.0), ("Yahoo", 0.1)]),
            summary("ZM", Category::Saas, &[("The Verge", -0.1)]),
        ]
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_market_sentiment_skips_empty_entities() {
        let market = market_sentiment(&run()).unwrap();
        // (0.4 - 0.6 + 0.1 - 0.1) / 4
        assert!((market.score - (-0.05)).abs() < 1e-9);
        assert_eq!(market.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_market_sentiment_without_evidence() {
        let summaries = vec![summary("NFLX", Category::Stock, &[])];
        assert!(market_sentiment(&summaries).is_none());
        assert!(distribution(&summaries).is_none());
        assert!(most_covered(&summaries).is_none());
        assert!(top_movers(&summaries, 5).is_empty());
    }

    #[test]
    fn test_sector_comparison() {
        let sectors = sector_comparison(&run());
        assert!((sectors.stock.unwrap() - (-0.1)).abs() < 1e-9);
        assert!((sectors.saas.unwrap() - 0.0).abs() < 1e-9);

        let stocks_only = vec![summary("AAPL", Category::Stock, &[("Yahoo", 0.5)])];
        assert!(sector_comparison(&stocks_only).saas.is_none());
    }

    #[test]
    fn test_top_movers_by_magnitude() {
        let movers = top_movers(&run(), 3);
        let ids: Vec<&str> = movers.iter().map(|m| m.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["TSLA", "AAPL", "CRM"]);
    }

    #[test]
    fn test_ranking_per_category() {
        let stocks = ranking(&run(), Category::Stock);
        let ids: Vec<&str> = stocks.iter().map(|m| m.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["AAPL", "TSLA"]);
    }

    #[test]
    fn test_extremes() {
        let summaries = run();
        assert_eq!(most_positive(&summaries, None).unwrap().entity_id, "AAPL");
        assert_eq!(most_negative(&summaries, None).unwrap().entity_id, "TSLA");
        assert_eq!(most_positive(&summaries, Some(Category::Saas)).unwrap().entity_id, "CRM");
        assert_eq!(most_negative(&summaries, Some(Category::Saas)).unwrap().entity_id, "ZM");
    }

    #[test]
    fn test_most_covered_and_total() {
        let summaries = run();
        let covered = most_covered(&summaries).unwrap();
        assert_eq!(covered.entity_id, "CRM");
        assert_eq!(covered.article_count, 3);
        assert_eq!(total_articles(&summaries), 7);
    }

    #[test]
    fn test_source_volume() {
        let volume = source_volume(&run());
        assert_eq!(volume[0], ("Yahoo".to_string(), 3));
        assert_eq!(volume[1], ("TechCrunch".to_string(), 2));
        // Equal counts sort by name
        assert_eq!(volume[2].0, "Reuters");
        assert_eq!(volume[3].0, "The Verge");
    }

    #[test]
    fn test_distribution() {
        let d = distribution(&run()).unwrap();
        assert_eq!(d.count, 7);
        assert_eq!(d.min, -0.6);
        assert_eq!(d.max, 0.5);
        assert!((d.median - 0.1).abs() < 1e-9);
        assert!((d.mean - 0.4 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_distribution_even_median() {
        let summaries = vec![summary("AAPL", Category::Stock, &[("a", 0.2), ("b", 0.4)])];
        assert!((distribution(&summaries).unwrap().median - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_top_evidence_leaves_summary_untouched() {
        let s = summary("TSLA", Category::Stock, &[("a", 0.1), ("b", -0.9), ("c", 0.4)]);
        let before = s.clone();
        let top = top_evidence(&s, 2);
        assert_eq!(top[0].score.overall, -0.9);
        assert_eq!(top[1].score.overall, 0.4);
        assert_eq!(s, before);
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&Insights::from_summaries(&run()));
        assert!(text.contains("Overall Market Sentiment: -0.050 (Neutral)"));
        assert!(text.contains("Most Positive Stock"));
        assert!(text.contains("AAPL (0.400)"));
        assert!(text.contains("Stocks: -0.100 | SaaS: 0.000"));
        assert!(text.contains("CRM (3 articles)"));
        // Entities without evidence are not ranked
        assert!(!text.contains("NFLX"));
    }

    #[test]
    fn test_render_text_empty_run() {
        let text = render_text(&Insights::from_summaries(&[]));
        assert!(text.contains("no data"));
        assert!(text.contains("No data available"));
        assert!(text.contains("Total Articles Analysed"));
    }

    #[tokio::test]
    async fn test_price_context_for_stock() {
        let history = StaticPriceHistory::new().with_closes(
            "AAPL",
            &[
                (date(2025, 3, 1), 200.0),
                (date(2025, 3, 2), 210.0),
                (date(2025, 3, 3), 220.0),
            ],
        );
        let s = summary("AAPL", Category::Stock, &[("Yahoo", 0.5)]);

        let ctx = price_context(&s, &history, date(2025, 3, 3), 30)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ctx.latest_close, 220.0);
        assert!((ctx.cumulative_return - 10.0).abs() < 1e-9);
        assert_eq!(ctx.daily_returns.len(), 2);
        assert_eq!(ctx.avg_sentiment, 0.5);
    }

    #[tokio::test]
    async fn test_price_context_missing_or_saas() {
        let history = StaticPriceHistory::new();
        let stock = summary("TSLA", Category::Stock, &[]);
        let saas = summary("CRM", Category::Saas, &[]);

        assert!(price_context(&stock, &history, date(2025, 3, 3), 30)
            .await
            .unwrap()
            .is_none());
        assert!(price_context(&saas, &history, date(2025, 3, 3), 30)
            .await
            .unwrap()
            .is_none());
    }
}
