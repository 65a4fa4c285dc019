//! Built-in watch-list: 10 stocks and 10 SaaS companies

use super::{Category, EntityDef};
use tracing::info;

/// (id, category, curated name variants)
const WATCHLIST: &[(&str, Category, &[&str])] = &[
    // US tech
    ("AAPL", Category::Stock, &["apple", "iphone", "tim cook"]),
    ("MSFT", Category::Stock, &["microsoft", "windows", "satya nadella"]),
    ("GOOGL", Category::Stock, &["google", "alphabet", "android"]),
    ("NVDA", Category::Stock, &["nvidia", "jensen huang", "gpu"]),
    // US financials
    ("JPM", Category::Stock, &["jpmorgan", "jp morgan", "jamie dimon"]),
    ("BAC", Category::Stock, &["bank of america", "bofa"]),
    ("GS", Category::Stock, &["goldman sachs", "goldman"]),
    // UK
    ("HSBA.L", Category::Stock, &["hsbc", "hongkong shanghai"]),
    ("BP.L", Category::Stock, &["british petroleum", "bp"]),
    ("AZN.L", Category::Stock, &["astrazeneca", "astra zeneca"]),
    // Core SaaS
    ("CRM", Category::Saas, &["salesforce", "marc benioff"]),
    ("SNOW", Category::Saas, &["snowflake"]),
    ("TEAM", Category::Saas, &["atlassian", "jira", "confluence"]),
    ("ZM", Category::Saas, &["zoom", "zoom video"]),
    ("DDOG", Category::Saas, &["datadog"]),
    // High-growth tech
    ("SHOP", Category::Saas, &["shopify"]),
    ("SQ", Category::Saas, &["square", "block inc", "jack dorsey"]),
    ("PLTR", Category::Saas, &["palantir"]),
    ("COIN", Category::Saas, &["coinbase"]),
    ("SPOT", Category::Saas, &["spotify"]),
];

/// Default entity declarations.
///
/// Stocks always carry their curated name variants. SaaS entities match on
/// ticker only unless `enrich_saas` is set.
pub fn default_entities(enrich_saas: bool) -> Vec<EntityDef> {
    if !enrich_saas {
        info!("SaaS entities use ticker-only matching (enrich_saas_aliases = false)");
    }

    WATCHLIST
        .iter()
        .map(|(id, category, names)| {
            let aliases = match category {
                Category::Saas if !enrich_saas => Vec::new(),
                _ => names.iter().map(|n| n.to_string()).collect(),
            };
            EntityDef {
                id: id.to_string(),
                category: *category,
                aliases,
            }
        })
        .collect()
}
