//! Price history for stock entities
//!
//! Only reporting reads prices; a missing series is `Ok(None)` and never
//! affects sentiment aggregation.

use crate::config::PriceConfig;
use crate::error::{Result, SentimentError};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One daily bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Source of daily OHLC series
#[async_trait]
pub trait PriceHistory: Send + Sync {
    /// Bars for `symbol` between `start` and `end` inclusive, oldest first.
    /// `None` when the symbol has no series.
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<OhlcBar>>>;
}

/// Percent change between consecutive closes
pub fn daily_returns(bars: &[OhlcBar]) -> Vec<f64> {
    bars.windows(2)
        .filter(|w| w[0].close != 0.0)
        .map(|w| (w[1].close - w[0].close) / w[0].close * 100.0)
        .collect()
}

/// Percent change from the first to the last close
pub fn cumulative_return(bars: &[OhlcBar]) -> Option<f64> {
    let first = bars.first()?;
    let last = bars.last()?;
    if first.close == 0.0 {
        return None;
    }
    Some((last.close - first.close) / first.close * 100.0)
}

/// Yahoo-style chart API client
pub struct YahooChartClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

/// Columns may contain nulls on non-trading rows
#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

impl YahooChartClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &PriceConfig) -> Result<Self> {
        Self::new(&config.base_url)
    }
}

#[async_trait]
impl PriceHistory for YahooChartClient {
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<OhlcBar>>> {
        let url = format!("{}/{}", self.base_url, symbol);
        let period1 = day_start(start).timestamp();
        let period2 = day_start(end + Duration::days(1)).timestamp();

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            debug!("No price series for {}", symbol);
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(SentimentError::SourceUnavailable {
                source_name: format!("prices/{}", symbol),
                reason: format!("HTTP {}", resp.status()),
            });
        }

        let body: ChartResponse = resp.json().await?;
        Ok(parse_chart(body))
    }
}

fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Rows with any missing column are skipped
fn parse_chart(body: ChartResponse) -> Option<Vec<OhlcBar>> {
    let result = body.chart.result?.into_iter().next()?;
    let quote = result.indicators.quote.into_iter().next()?;

    let bars: Vec<OhlcBar> = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let date = DateTime::from_timestamp(*ts, 0)?.date_naive();
            Some(OhlcBar {
                date,
                open: (*quote.open.get(i)?)?,
                high: (*quote.high.get(i)?)?,
                low: (*quote.low.get(i)?)?,
                close: (*quote.close.get(i)?)?,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            })
        })
        .collect();

    if bars.is_empty() {
        None
    } else {
        Some(bars)
    }
}

/// In-memory price series keyed by symbol
#[derive(Debug, Default, Clone)]
pub struct StaticPriceHistory {
    series: HashMap<String, Vec<OhlcBar>>,
}

impl StaticPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a series from `(date, close)` pairs; open/high/low mirror the close
    pub fn with_closes(mut self, symbol: &str, closes: &[(NaiveDate, f64)]) -> Self {
        let bars = closes
            .iter()
            .map(|(date, close)| OhlcBar {
                date: *date,
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 0,
            })
            .collect();
        self.series.insert(symbol.to_uppercase(), bars);
        self
    }
}

#[async_trait]
impl PriceHistory for StaticPriceHistory {
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<OhlcBar>>> {
        Ok(self.series.get(&symbol.to_uppercase()).and_then(|bars| {
            let window: Vec<OhlcBar> = bars
                .iter()
                .filter(|b| b.date >= start && b.date <= end)
                .copied()
                .collect();
            (!window.is_empty()).then_some(window)
        }))
    }
}
