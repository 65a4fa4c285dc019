//! News Sentiment Aggregator
//!
//! Scores news about a watch-list of listed companies and SaaS businesses:
//! feeds are fetched, items matched to entities by alias, scored by two fused
//! sentiment models and aggregated into one summary per entity.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod feed;
pub mod matcher;
pub mod pipeline;
pub mod price;
pub mod registry;
pub mod report;
pub mod sentiment;
pub mod storage;

#[cfg(test)]
mod error_tests;
