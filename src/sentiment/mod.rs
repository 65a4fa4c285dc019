//! News Sentiment Scoring
//!
//! Scores a block of text with two independent models and fuses them:
//! - Lexicon/rule-based compound model (`compound`, `positive`, `negative`, `neutral`)
//! - Polarity/subjectivity model (`polarity`, `subjectivity`)
//!
//! `overall = compound * 0.6 + polarity * 0.4` is the single score used
//! downstream. A polarity model failure degrades to `polarity = 0,
//! subjectivity = 0` and is reported through [`Outcome::Degraded`].

pub mod label;
pub mod lexicon;
pub mod polarity;


pub use label::SentimentLabel;
pub use lexicon::LexiconAnalyzer;
pub use polarity::PolarityAnalyzer;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Weight of the compound model in the fused score
pub const COMPOUND_WEIGHT: f64 = 0.6;
/// Weight of the polarity model in the fused score
pub const POLARITY_WEIGHT: f64 = 0.4;

/// Failure of a single sentiment model on a given text
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("model failure: {0}")]
    Failed(String),
}

/// Output of the compound model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundScores {
    /// Normalized sum of valences (-1.0 to 1.0)
    pub compound: f64,
    /// Share of positive signal (0.0 to 1.0)
    pub positive: f64,
    /// Share of negative signal (0.0 to 1.0)
    pub negative: f64,
    /// Share of neutral tokens (0.0 to 1.0)
    pub neutral: f64,
}

/// Output of the polarity model
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarityScores {
    /// -1.0 to 1.0
    pub polarity: f64,
    /// 0.0 (objective) to 1.0 (subjective)
    pub subjectivity: f64,
}

/// Lexicon/rule-based compound model
pub trait CompoundModel: Send + Sync {
    fn compound(&self, text: &str) -> Result<CompoundScores, ModelError>;
}

/// Polarity/subjectivity model
pub trait PolarityModel: Send + Sync {
    fn polarity(&self, text: &str) -> Result<PolarityScores, ModelError>;
}

/// Fused sentiment for one text block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
    pub polarity: f64,
    pub subjectivity: f64,
    pub overall: f64,
}

impl SentimentScore {
    /// Fixed score for empty text
    pub const fn neutral() -> Self {
        Self {
            compound: 0.0,
            positive: 0.0,
            negative: 0.0,
            neutral: 1.0,
            polarity: 0.0,
            subjectivity: 0.0,
            overall: 0.0,
        }
    }

    /// Combine both model outputs with the fixed weights
    pub fn fuse(c: CompoundScores, p: PolarityScores) -> Self {
        let compound = c.compound.clamp(-1.0, 1.0);
        let polarity = p.polarity.clamp(-1.0, 1.0);
        Self {
            compound,
            positive: c.positive.clamp(0.0, 1.0),
            negative: c.negative.clamp(0.0, 1.0),
            neutral: c.neutral.clamp(0.0, 1.0),
            polarity,
            subjectivity: p.subjectivity.clamp(0.0, 1.0),
            overall: compound * COMPOUND_WEIGHT + polarity * POLARITY_WEIGHT,
        }
    }

    pub fn label(&self) -> SentimentLabel {
        SentimentLabel::classify(self.overall)
    }
}

/// Model result tagged with whether a fallback was substituted
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Complete(T),
    Degraded { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Outcome::Complete(v) => v,
            Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Complete(v) => v,
            Outcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Outcome::Complete(_) => None,
            Outcome::Degraded { reason, .. } => Some(reason),
        }
    }
}

/// Two-model sentiment scorer. Stateless across calls.
pub struct Scorer {
    compound_model: Box<dyn CompoundModel>,
    polarity_model: Box<dyn PolarityModel>,
}

impl Scorer {
    /// Scorer with the built-in lexicon and polarity models
    pub fn new() -> Self {
        Self::with_models(
            Box::new(LexiconAnalyzer::new()),
            Box::new(PolarityAnalyzer::new()),
        )
    }

    pub fn with_models(
        compound_model: Box<dyn CompoundModel>,
        polarity_model: Box<dyn PolarityModel>,
    ) -> Self {
        Self {
            compound_model,
            polarity_model,
        }
    }

    /// Score a text, reporting a polarity-model fallback as `Degraded`.
    ///
    /// Errors only when the compound model itself fails; callers drop the
    /// item in that case.
    pub fn evaluate(&self, text: &str) -> Result<Outcome<SentimentScore>, ModelError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Outcome::Complete(SentimentScore::neutral()));
        }

        let compound = self.compound_model.compound(text)?;

        match self.polarity_model.polarity(text) {
            Ok(p) => Ok(Outcome::Complete(SentimentScore::fuse(compound, p))),
            Err(e) => {
                warn!("Polarity model degraded: {}", e);
                Ok(Outcome::Degraded {
                    value: SentimentScore::fuse(compound, PolarityScores::default()),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Fused score; a compound-model failure yields the neutral score
    pub fn score(&self, text: &str) -> SentimentScore {
        match self.evaluate(text) {
            Ok(outcome) => outcome.into_value(),
            Err(e) => {
                warn!("Compound model failed, using neutral score: {}", e);
                SentimentScore::neutral()
            }
        }
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new()
    }
}
