//! Unit tests for feed ingestion

#[cfg(test)]
mod tests {
    use super::super::mock::{FailingFeedSource, SlowFeedSource, StaticFeedSource};
    use super::super::rss::{parse_date, parse_feed, strip_html};
    use super::super::*;
    use chrono::{Datelike, Timelike};

    const RSS_FIXTURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Business News</title>
    <link>https://example.com</link>
    <item>
      <title>Apple beats earnings estimates</title>
      <description>&lt;p&gt;Shares &lt;b&gt;rise&lt;/b&gt; after the report&lt;/p&gt;</description>
      <link>https://example.com/apple</link>
      <pubDate>Tue, 10 Jun 2025 14:30:00 GMT</pubDate>
    </item>
    <item>
      <title><![CDATA[Zoom faces user decline]]></title>
      <description><![CDATA[<div>Competition &amp; churn</div>]]></description>
      <link>https://example.com/zoom</link>
      <pubDate>not a date</pubDate>
    </item>
  </channel>
</rss>"#;

    const ATOM_FIXTURE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Tech Feed</title>
  <entry>
    <title>Snowflake launches new product</title>
    <link rel="alternate" href="https://example.com/snow"/>
    <link rel="replies" href="https://example.com/snow/comments"/>
    <updated>2025-06-10T09:15:00Z</updated>
    <summary>Strong demand from enterprise customers</summary>
  </entry>
  <entry>
    <title>Datadog update</title>
    <link href="https://example.com/ddog"/>
    <content type="html">&lt;p&gt;Observability news&lt;/p&gt;</content>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_rss() {
        let items = parse_feed(RSS_FIXTURE, "Reuters").unwrap();
        assert_eq!(items.len(), 2);

        let apple = &items[0];
        assert_eq!(apple.title, "Apple beats earnings estimates");
        assert_eq!(apple.summary, "Shares rise after the report");
        assert_eq!(apple.link, "https://example.com/apple");
        assert_eq!(apple.source_id, "Reuters");
        let published = apple.published_at.unwrap();
        assert_eq!(published.year(), 2025);
        assert_eq!(published.hour(), 14);

        let zoom = &items[1];
        assert_eq!(zoom.title, "Zoom faces user decline");
        assert_eq!(zoom.summary, "Competition & churn");
        assert!(zoom.published_at.is_none());
    }

    #[test]
    fn test_parse_atom() {
        let items = parse_feed(ATOM_FIXTURE, "TechCrunch").unwrap();
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "Snowflake launches new product");
        assert_eq!(items[0].link, "https://example.com/snow");
        assert_eq!(items[0].summary, "Strong demand from enterprise customers");
        assert!(items[0].published_at.is_some());

        // Falls back to <content> when there is no summary
        assert_eq!(items[1].summary, "Observability news");
        assert_eq!(items[1].link, "https://example.com/ddog");
    }

    #[test]
    fn test_parse_ignores_nested_media_fields() {
        let xml = r#"<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <item>
      <title>Apple beats earnings estimates</title>
      <description>Quarter recap</description>
      <media:content url="https://example.com/photo.jpg">
        <media:title>Crash scene photo</media:title>
        <media:description>Disaster fraud crisis</media:description>
      </media:content>
      <media:title>Stock image</media:title>
      <source url="https://example.com/feed"><title>Other Outlet</title></source>
    </item>
  </channel>
</rss>"#;
        let items = parse_feed(xml, "Yahoo").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Apple beats earnings estimates");
        assert_eq!(items[0].summary, "Quarter recap");
    }

    #[test]
    fn test_parse_malformed_feed() {
        let err = parse_feed("<rss><channel><item><title>x</wrong></item>", "bad").unwrap_err();
        assert!(matches!(err, SentimentError::FeedParse(_)));
    }

    #[test]
    fn test_parse_empty_feed() {
        let items = parse_feed("<rss><channel></channel></rss>", "empty").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date("Tue, 10 Jun 2025 14:30:00 +0000").is_some());
        assert!(parse_date("2025-06-10T09:15:00+01:00").is_some());
        assert!(parse_date("").is_none());
        assert!(parse_date("yesterday").is_none());
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_html("AT&amp;T&nbsp;deal"), "AT&T deal");
        assert_eq!(strip_html("  plain   text "), "plain text");
        assert_eq!(strip_html("S&P 500 < 4000 as rates climb"), "S&P 500 < 4000 as rates climb");
        assert_eq!(strip_html("a <b>bold</b> 3<5 call"), "a bold 3<5 call");
        assert_eq!(strip_html("unclosed <tag at end"), "unclosed <tag at end");
    }

    #[test]
    fn test_news_item_text() {
        let item = NewsItem::new("s", "Title", "Summary");
        assert_eq!(item.text(), "Title Summary");
    }

    #[tokio::test]
    async fn test_registered_source_stamps_name_and_truncates() {
        let items = vec![
            NewsItem::new("other", "a", ""),
            NewsItem::new("other", "b", ""),
            NewsItem::new("other", "c", ""),
        ];
        let set = FeedSourceSet::new(Duration::ZERO).with_source(
            "Yahoo Finance",
            Category::Stock,
            Arc::new(StaticFeedSource::new("other", items)),
        );

        let source = &set.for_category(Category::Stock)[0];
        let fetched = source.fetch(2, Duration::from_secs(1)).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert!(fetched.iter().all(|i| i.source_id == "Yahoo Finance"));
    }

    #[tokio::test]
    async fn test_registered_source_timeout() {
        let slow = SlowFeedSource::new(
            Duration::from_secs(5),
            StaticFeedSource::from_headlines("slow", &["late"]),
        );
        let set = FeedSourceSet::new(Duration::ZERO).with_source("slow", Category::Saas, Arc::new(slow));

        let source = &set.for_category(Category::Saas)[0];
        let err = source.fetch(10, Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, SentimentError::Timeout { .. }));
        assert!(err.is_source_failure());
    }

    #[tokio::test]
    async fn test_registered_source_propagates_failure() {
        let set = FeedSourceSet::new(Duration::ZERO).with_source(
            "down",
            Category::Stock,
            Arc::new(FailingFeedSource::new("down", "503")),
        );
        let source = &set.for_category(Category::Stock)[0];
        let err = source.fetch(10, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, SentimentError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_mocked_source() {
        let mut mock = MockFeedSource::new();
        mock.expect_fetch()
            .withf(|limit| *limit == 20)
            .times(1)
            .returning(|_| Ok(vec![NewsItem::new("m", "Nvidia rallies", "")]));

        let set = FeedSourceSet::new(Duration::ZERO).with_source("mocked", Category::Stock, Arc::new(mock));
        let source = &set.for_category(Category::Stock)[0];
        let items = source.fetch(20, Duration::from_secs(1)).await.unwrap();
        assert_eq!(items[0].source_id, "mocked");
    }

    #[test]
    fn test_for_category_filters_and_keeps_order() {
        let set = FeedSourceSet::new(Duration::ZERO)
            .with_source("a", Category::Stock, Arc::new(StaticFeedSource::new("a", vec![])))
            .with_source("b", Category::Saas, Arc::new(StaticFeedSource::new("b", vec![])))
            .with_source("c", Category::Stock, Arc::new(StaticFeedSource::new("c", vec![])));

        let names: Vec<String> = set
            .for_category(Category::Stock)
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_from_config_registers_all_feeds() {
        let set = FeedSourceSet::from_config(&Config::default()).unwrap();
        assert_eq!(set.len(), 8);
        assert_eq!(set.for_category(Category::Saas).len(), 4);
    }
}
