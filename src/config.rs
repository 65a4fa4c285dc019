//! Configuration management

use crate::registry::{watchlist, Category, EntityDef, EntityRegistry};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default = "default_feeds")]
    pub feeds: Vec<FeedConfig>,
    /// Empty means the built-in watch-list
    #[serde(default)]
    pub entities: Vec<EntityDef>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub prices: PriceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Most recent items taken from each feed
    pub max_items_per_source: usize,
    /// Per-fetch timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Minimum delay between two calls to the same source
    pub min_source_interval_ms: u64,
    /// Upper bound on in-flight fetches
    pub max_concurrent_fetches: usize,
    /// Apply curated name variants to SaaS entities of the built-in watch-list
    pub enrich_saas_aliases: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Display name, also used as the source id on news items
    pub name: String,
    pub url: String,
    pub category: Category,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for persisted run reports
    pub dir: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    /// Chart API endpoint
    pub base_url: String,
    /// Days of history attached to stock reports
    pub lookback_days: i64,
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path
            .as_ref()
            .to_str()
            .ok_or_else(|| anyhow::anyhow!("Config path is not valid UTF-8"))?;

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("NEWS_SENTIMENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations, falling back to built-in defaults
    pub fn load_default() -> anyhow::Result<Self> {
        let paths = ["config.toml", "~/.config/news-sentiment/config.toml"];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                tracing::info!("Loading configuration from {}", expanded);
                return Self::load(expanded.as_ref());
            }
        }

        tracing::info!("No configuration file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pipeline.max_items_per_source == 0 {
            anyhow::bail!("pipeline.max_items_per_source must be at least 1");
        }
        if self.pipeline.max_concurrent_fetches == 0 {
            anyhow::bail!("pipeline.max_concurrent_fetches must be at least 1");
        }
        if self.pipeline.fetch_timeout_secs == 0 {
            anyhow::bail!("pipeline.fetch_timeout_secs must be at least 1");
        }
        for feed in &self.feeds {
            if feed.name.trim().is_empty() || feed.url.trim().is_empty() {
                anyhow::bail!("feeds entries need a name and a url");
            }
        }
        Ok(())
    }

    /// Build the validated entity registry.
    ///
    /// Explicitly declared entities are used verbatim; otherwise the
    /// built-in watch-list applies.
    pub fn registry(&self) -> crate::error::Result<EntityRegistry> {
        if self.entities.is_empty() {
            EntityRegistry::from_defs(&watchlist::default_entities(
                self.pipeline.enrich_saas_aliases,
            ))
        } else {
            EntityRegistry::from_defs(&self.entities)
        }
    }
}

impl PipelineConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn min_source_interval(&self) -> Duration {
        Duration::from_millis(self.min_source_interval_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            feeds: default_feeds(),
            entities: Vec::new(),
            output: OutputConfig::default(),
            prices: PriceConfig::default(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_items_per_source: 20,
            fetch_timeout_secs: 15,
            min_source_interval_ms: 1000,
            max_concurrent_fetches: 4,
            enrich_saas_aliases: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
        }
    }
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            lookback_days: 30,
        }
    }
}

fn default_feeds() -> Vec<FeedConfig> {
    let feed = |name: &str, url: &str, category| FeedConfig {
        name: name.to_string(),
        url: url.to_string(),
        category,
    };

    vec![
        feed("Yahoo Finance", "https://finance.yahoo.com/rss/", Category::Stock),
        feed(
            "Reuters Business",
            "https://feeds.reuters.com/reuters/businessNews",
            Category::Stock,
        ),
        feed(
            "MarketWatch",
            "http://feeds.marketwatch.com/marketwatch/topstories",
            Category::Stock,
        ),
        feed("Financial Times", "https://www.ft.com/?format=rss", Category::Stock),
        feed("TechCrunch", "https://techcrunch.com/feed/", Category::Saas),
        feed("The Verge", "https://www.theverge.com/rss/index.xml", Category::Saas),
        feed("Hacker News", "https://hnrss.org/frontpage", Category::Saas),
        feed("VentureBeat", "https://feeds.venturebeat.com/VentureBeat", Category::Saas),
    ]
}
