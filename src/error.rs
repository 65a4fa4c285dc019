//! Error types for the sentiment pipeline

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentimentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Entity registry is empty")]
    EmptyRegistry,

    #[error("Invalid entity {id}: {reason}")]
    InvalidEntity { id: String, reason: String },

    #[error("Source unavailable: {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Source {source_name} timed out after {after:?}")]
    Timeout { source_name: String, after: Duration },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feed parse error: {0}")]
    FeedParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SentimentError {
    /// Returns true for failures that only remove one source from a run
    pub fn is_source_failure(&self) -> bool {
        matches!(
            self,
            SentimentError::SourceUnavailable { .. }
                | SentimentError::Timeout { .. }
                | SentimentError::Network(_)
                | SentimentError::FeedParse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
