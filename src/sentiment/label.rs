//! Sentiment labels

use serde::{Deserialize, Serialize};
use std::fmt;

pub const VERY_POSITIVE_MIN: f64 = 0.3;
pub const POSITIVE_MIN: f64 = 0.1;
pub const NEGATIVE_MAX: f64 = -0.1;
pub const VERY_NEGATIVE_MAX: f64 = -0.3;

/// Five-way partition of the score range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Very Positive")]
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    #[serde(rename = "Very Negative")]
    VeryNegative,
}

impl SentimentLabel {
    /// Total over all floats; NaN falls through to `Neutral`.
    ///
    /// ```text
    /// score >= 0.3          VeryPositive
    /// 0.1 <= score < 0.3    Positive
    /// -0.1 < score < 0.1    Neutral
    /// -0.3 < score <= -0.1  Negative
    /// score <= -0.3         VeryNegative
    /// ```
    pub fn classify(score: f64) -> Self {
        if score >= VERY_POSITIVE_MIN {
            SentimentLabel::VeryPositive
        } else if score >= POSITIVE_MIN {
            SentimentLabel::Positive
        } else if score <= VERY_NEGATIVE_MAX {
            SentimentLabel::VeryNegative
        } else if score <= NEGATIVE_MAX {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::VeryPositive => "Very Positive",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::VeryNegative => "Very Negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
