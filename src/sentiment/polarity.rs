//! Polarity/subjectivity model
//!
//! Pattern-style adjective lexicon: each known word carries a polarity
//! (-1.0 to 1.0) and a subjectivity (0.0 to 1.0). Intensifiers scale the next
//! assessment, negations flip and halve its polarity, and the text score is
//! the mean over all assessments.

use super::lexicon::clean_word;
use super::{ModelError, PolarityModel, PolarityScores};
use std::collections::{HashMap, HashSet};

/// Longest text the model accepts, in words
const MAX_WORDS: usize = 5_000;
/// Words looked back for intensifiers and negations
const MODIFIER_WINDOW: usize = 2;

#[derive(Debug, Clone, Copy)]
struct Assessment {
    polarity: f64,
    subjectivity: f64,
}

/// Polarity and subjectivity scorer
pub struct PolarityAnalyzer {
    lexicon: HashMap<&'static str, Assessment>,
    intensifiers: HashMap<&'static str, f64>,
    negations: HashSet<&'static str>,
}

impl PolarityAnalyzer {
    pub fn new() -> Self {
        let entries: &[(&str, f64, f64)] = &[
            // word, polarity, subjectivity
            ("good", 0.7, 0.6),
            ("great", 0.8, 0.75),
            ("excellent", 1.0, 1.0),
            ("amazing", 0.6, 0.9),
            ("best", 1.0, 0.3),
            ("better", 0.5, 0.5),
            ("strong", 0.43, 0.73),
            ("positive", 0.23, 0.55),
            ("successful", 0.75, 0.95),
            ("impressive", 1.0, 1.0),
            ("healthy", 0.5, 0.5),
            ("robust", 0.4, 0.6),
            ("solid", 0.3, 0.5),
            ("optimistic", 0.5, 0.6),
            ("record-breaking", 0.6, 0.7),
            ("happy", 0.8, 1.0),
            ("new", 0.14, 0.45),
            ("innovative", 0.5, 0.6),
            ("profitable", 0.5, 0.6),
            ("massive", 0.0, 1.0),
            ("huge", 0.4, 0.9),
            ("major", 0.06, 0.5),
            ("normal", 0.15, 0.65),
            ("stable", 0.2, 0.3),
            ("high", 0.16, 0.54),
            ("higher", 0.25, 0.5),
            ("bad", -0.7, 0.67),
            ("worse", -0.4, 0.6),
            ("worst", -1.0, 1.0),
            ("poor", -0.4, 0.6),
            ("weak", -0.38, 0.63),
            ("weaker", -0.4, 0.6),
            ("negative", -0.3, 0.4),
            ("terrible", -1.0, 1.0),
            ("awful", -1.0, 1.0),
            ("disappointing", -0.6, 0.7),
            ("uncertain", -0.2, 0.6),
            ("volatile", -0.3, 0.6),
            ("risky", -0.5, 0.7),
            ("low", -0.1, 0.3),
            ("lower", -0.1, 0.3),
            ("slow", -0.3, 0.4),
            ("sluggish", -0.4, 0.6),
            ("difficult", -0.5, 1.0),
            ("serious", -0.33, 0.67),
            ("fierce", -0.4, 0.7),
            ("grim", -0.6, 0.8),
            ("sad", -0.5, 1.0),
        ];

        let intensifiers: &[(&str, f64)] = &[
            ("very", 1.3),
            ("extremely", 1.5),
            ("really", 1.3),
            ("highly", 1.3),
            ("incredibly", 1.4),
            ("deeply", 1.3),
            ("quite", 1.1),
            ("somewhat", 0.8),
            ("slightly", 0.7),
        ];

        Self {
            lexicon: entries
                .iter()
                .map(|(w, p, s)| {
                    (
                        *w,
                        Assessment {
                            polarity: *p,
                            subjectivity: *s,
                        },
                    )
                })
                .collect(),
            intensifiers: intensifiers.iter().copied().collect(),
            negations: [
                "not", "no", "never", "without", "isn't", "aren't", "wasn't", "weren't",
                "doesn't", "don't", "didn't", "won't", "can't", "cannot",
            ]
            .into_iter()
            .collect(),
        }
    }

    /// Score a text; rejects control characters and oversized input
    pub fn analyze(&self, text: &str) -> Result<PolarityScores, ModelError> {
        if let Some(c) = text.chars().find(|c| c.is_control() && !c.is_whitespace()) {
            return Err(ModelError::MalformedInput(format!(
                "control character U+{:04X}",
                c as u32
            )));
        }

        let words: Vec<String> = text
            .split_whitespace()
            .map(clean_word)
            .filter(|w| !w.is_empty())
            .collect();

        if words.len() > MAX_WORDS {
            return Err(ModelError::MalformedInput(format!(
                "{} words exceeds limit of {}",
                words.len(),
                MAX_WORDS
            )));
        }

        let assessments: Vec<Assessment> = words
            .iter()
            .enumerate()
            .filter_map(|(i, w)| {
                self.lexicon
                    .get(w.as_str())
                    .map(|a| self.apply_modifiers(&words, i, *a))
            })
            .collect();

        if assessments.is_empty() {
            return Ok(PolarityScores::default());
        }

        let n = assessments.len() as f64;
        let polarity = assessments.iter().map(|a| a.polarity).sum::<f64>() / n;
        let subjectivity = assessments.iter().map(|a| a.subjectivity).sum::<f64>() / n;

        Ok(PolarityScores {
            polarity: polarity.clamp(-1.0, 1.0),
            subjectivity: subjectivity.clamp(0.0, 1.0),
        })
    }

    fn apply_modifiers(&self, words: &[String], index: usize, mut a: Assessment) -> Assessment {
        let start = index.saturating_sub(MODIFIER_WINDOW);
        for prev in &words[start..index] {
            if let Some(&factor) = self.intensifiers.get(prev.as_str()) {
                a.polarity *= factor;
                a.subjectivity *= factor;
            }
            if self.negations.contains(prev.as_str()) {
                a.polarity *= -0.5;
            }
        }
        Assessment {
            polarity: a.polarity.clamp(-1.0, 1.0),
            subjectivity: a.subjectivity.clamp(0.0, 1.0),
        }
    }
}

impl Default for PolarityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityModel for PolarityAnalyzer {
    fn polarity(&self, text: &str) -> Result<PolarityScores, ModelError> {
        self.analyze(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_text() {
        let model = PolarityAnalyzer::new();
        let r = model.analyze("An excellent quarter with strong demand").unwrap();
        assert!(r.polarity > 0.5);
        assert!(r.subjectivity > 0.5);
    }

    #[test]
    fn test_negative_text() {
        let model = PolarityAnalyzer::new();
        let r = model.analyze("A disappointing and weak outlook").unwrap();
        assert!(r.polarity < -0.3);
    }

    #[test]
    fn test_no_known_words() {
        let model = PolarityAnalyzer::new();
        let r = model.analyze("Company files quarterly report").unwrap();
        assert_eq!(r, PolarityScores::default());
    }

    #[test]
    fn test_intensifier_raises_polarity() {
        let model = PolarityAnalyzer::new();
        let plain = model.analyze("good results").unwrap();
        let boosted = model.analyze("very good results").unwrap();
        assert!(boosted.polarity > plain.polarity);
    }

    #[test]
    fn test_negation_flips() {
        let model = PolarityAnalyzer::new();
        let r = model.analyze("results were not good").unwrap();
        assert!((r.polarity - (-0.35)).abs() < 1e-9);
    }

    #[test]
    fn test_bounds() {
        let model = PolarityAnalyzer::new();
        let r = model.analyze("extremely extremely excellent").unwrap();
        assert!(r.polarity <= 1.0);
        assert!(r.subjectivity <= 1.0);
    }

    #[test]
    fn test_rejects_control_characters() {
        let model = PolarityAnalyzer::new();
        let err = model.analyze("good\u{0}news").unwrap_err();
        assert!(matches!(err, ModelError::MalformedInput(_)));
    }

    #[test]
    fn test_allows_ordinary_whitespace() {
        let model = PolarityAnalyzer::new();
        assert!(model.analyze("good\tnews\nfor investors\r\n").is_ok());
    }

    #[test]
    fn test_rejects_oversized_text() {
        let model = PolarityAnalyzer::new();
        let text = "word ".repeat(MAX_WORDS + 1);
        assert!(model.analyze(&text).is_err());
    }
}
