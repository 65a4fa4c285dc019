//! Lexicon Sentiment Model
//!
//! VADER-style compound scoring tuned for financial and tech headlines.
//! Valences are on the -4.0 to 4.0 scale; the sum is normalized into
//! (-1.0, 1.0) with `x / sqrt(x^2 + alpha)`.

use super::{CompoundModel, CompoundScores, ModelError};
use std::collections::{HashMap, HashSet};

/// Normalization constant for the compound score
const ALPHA: f64 = 15.0;
/// Words looked back for boosters and negations
const MODIFIER_WINDOW: usize = 3;
/// Negation flips and dampens the valence
const NEGATION_FACTOR: f64 = -0.74;
const MAX_VALENCE: f64 = 4.0;

/// Rule-based compound sentiment model
pub struct LexiconAnalyzer {
    /// General-purpose word valences
    lexicon: HashMap<String, f64>,
    /// Market and business terms, checked first
    finance_lexicon: HashMap<String, f64>,
    /// Intensity modifiers (very, sharply, etc.)
    boosters: HashMap<String, f64>,
    /// Negation words
    negations: HashSet<String>,
}

impl LexiconAnalyzer {
    /// Create a new analyzer with default lexicons
    pub fn new() -> Self {
        let mut analyzer = Self {
            lexicon: HashMap::new(),
            finance_lexicon: HashMap::new(),
            boosters: HashMap::new(),
            negations: HashSet::new(),
        };
        analyzer.init_lexicons();
        analyzer
    }

    fn init_lexicons(&mut self) {
        let positive_words = [
            ("good", 1.9),
            ("great", 3.1),
            ("excellent", 2.7),
            ("amazing", 2.8),
            ("best", 3.2),
            ("better", 1.9),
            ("strong", 2.3),
            ("stronger", 2.1),
            ("strongest", 2.4),
            ("success", 2.7),
            ("successful", 2.8),
            ("win", 2.8),
            ("wins", 2.7),
            ("positive", 2.3),
            ("optimistic", 2.0),
            ("confident", 2.2),
            ("improve", 1.9),
            ("improved", 2.1),
            ("improves", 1.9),
            ("innovative", 1.9),
            ("opportunity", 1.8),
            ("opportunities", 1.6),
            ("exceeding", 1.4),
            ("exceeds", 1.6),
            ("exceeded", 1.6),
            ("boost", 1.7),
            ("boosts", 1.5),
            ("robust", 1.9),
            ("healthy", 1.7),
            ("impressive", 2.3),
            ("celebrate", 2.7),
            ("love", 3.2),
            ("happy", 2.7),
            ("popular", 1.8),
            ("welcome", 2.0),
            ("secure", 1.4),
            ("stable", 1.2),
        ];

        let negative_words = [
            ("bad", -2.5),
            ("terrible", -2.1),
            ("awful", -2.0),
            ("worst", -3.1),
            ("worse", -2.1),
            ("poor", -2.1),
            ("weak", -1.9),
            ("weaker", -1.9),
            ("fail", -2.5),
            ("fails", -2.3),
            ("failed", -2.3),
            ("failure", -2.3),
            ("negative", -2.7),
            ("fear", -2.2),
            ("fears", -1.8),
            ("worry", -1.9),
            ("worries", -1.8),
            ("concern", -1.3),
            ("concerns", -1.4),
            ("crisis", -3.1),
            ("panic", -2.9),
            ("threat", -2.4),
            ("threatens", -2.2),
            ("risk", -1.1),
            ("risky", -1.4),
            ("danger", -2.4),
            ("problem", -1.7),
            ("problems", -1.7),
            ("trouble", -1.7),
            ("breach", -2.0),
            ("attack", -2.1),
            ("hack", -1.8),
            ("hacked", -1.9),
            ("affected", -0.9),
            ("scandal", -2.6),
            ("fraud", -2.8),
            ("lawsuit", -1.6),
            ("sued", -1.7),
            ("fined", -1.6),
            ("penalty", -1.8),
            ("outage", -1.9),
            ("warns", -1.4),
            ("warning", -1.4),
            ("hurt", -2.4),
            ("hurts", -2.1),
            ("sad", -2.1),
        ];

        for (word, score) in positive_words.iter().chain(negative_words.iter()) {
            self.lexicon.insert(word.to_string(), *score);
        }

        let finance_terms = [
            // Bullish
            ("beat", 1.6),
            ("beats", 2.0),
            ("record", 1.3),
            ("record-breaking", 2.6),
            ("profit", 1.9),
            ("profits", 1.9),
            ("profitable", 2.1),
            ("gain", 2.0),
            ("gains", 1.9),
            ("growth", 2.0),
            ("surge", 2.2),
            ("surges", 2.2),
            ("soar", 2.4),
            ("soars", 2.4),
            ("soaring", 2.3),
            ("rally", 2.0),
            ("rallies", 2.0),
            ("jump", 1.5),
            ("jumps", 1.5),
            ("rise", 1.2),
            ("rises", 1.2),
            ("climb", 1.1),
            ("climbs", 1.1),
            ("upgrade", 1.8),
            ("upgraded", 1.8),
            ("outperform", 1.9),
            ("bullish", 2.2),
            ("expansion", 1.3),
            ("expands", 1.3),
            ("partnership", 1.2),
            ("dividend", 1.1),
            ("buyback", 1.1),
            ("recovery", 1.7),
            ("rebound", 1.6),
            ("adoption", 1.0),
            // Bearish
            ("miss", -1.6),
            ("misses", -1.8),
            ("missed", -1.7),
            ("loss", -2.1),
            ("losses", -2.2),
            ("decline", -2.0),
            ("declines", -1.9),
            ("declining", -1.9),
            ("drop", -1.7),
            ("drops", -1.7),
            ("fall", -1.6),
            ("falls", -1.7),
            ("plunge", -2.5),
            ("plunges", -2.5),
            ("plummet", -2.8),
            ("plummets", -2.8),
            ("slump", -2.3),
            ("slumps", -2.3),
            ("tumble", -2.2),
            ("tumbles", -2.2),
            ("crash", -3.0),
            ("crashes", -2.9),
            ("sink", -1.6),
            ("sinks", -1.6),
            ("cut", -1.1),
            ("cuts", -1.2),
            ("layoffs", -2.3),
            ("downgrade", -1.9),
            ("downgraded", -1.9),
            ("underperform", -1.8),
            ("bearish", -2.2),
            ("recession", -2.6),
            ("slowdown", -1.8),
            ("bankruptcy", -3.0),
            ("default", -2.0),
            ("volatile", -1.1),
            ("volatility", -0.9),
            ("selloff", -2.1),
            ("sell-off", -2.1),
            ("competition", -0.8),
            ("headwinds", -1.5),
            ("investigation", -1.7),
            ("probe", -1.5),
        ];

        for (term, score) in finance_terms {
            self.finance_lexicon.insert(term.to_string(), score);
        }

        let boosters = [
            ("very", 1.3),
            ("really", 1.3),
            ("extremely", 1.5),
            ("highly", 1.3),
            ("incredibly", 1.4),
            ("massive", 1.4),
            ("massively", 1.4),
            ("major", 1.3),
            ("huge", 1.4),
            ("sharply", 1.4),
            ("significantly", 1.3),
            ("strongly", 1.3),
            ("slightly", 0.7),
            ("marginally", 0.7),
        ];

        for (word, factor) in boosters {
            self.boosters.insert(word.to_string(), factor);
        }

        self.negations = [
            "not", "no", "never", "none", "neither", "nobody", "nothing", "without",
            "isn't", "aren't", "wasn't", "weren't", "hasn't", "haven't", "hadn't",
            "doesn't", "don't", "didn't", "won't", "wouldn't", "can't", "cannot",
            "couldn't", "shouldn't",
        ]
        .iter()
        .map(|w| w.to_string())
        .collect();
    }

    /// Analyze sentiment of text
    pub fn analyze(&self, text: &str) -> CompoundScores {
        let lower = text.to_lowercase();
        let words: Vec<String> = lower
            .split_whitespace()
            .map(clean_word)
            .filter(|w| !w.is_empty())
            .collect();

        let mut valences: Vec<f64> = Vec::new();
        let mut neutral_count = 0usize;

        for (i, word) in words.iter().enumerate() {
            // Market terms take priority over general words
            let base = self
                .finance_lexicon
                .get(word)
                .or_else(|| self.lexicon.get(word))
                .copied();

            match base {
                Some(score) => valences.push(self.apply_modifiers(&words, i, score)),
                None if self.boosters.contains_key(word) || self.negations.contains(word) => {}
                None => neutral_count += 1,
            }
        }

        if valences.is_empty() {
            return CompoundScores {
                compound: 0.0,
                positive: 0.0,
                negative: 0.0,
                neutral: 1.0,
            };
        }

        let positive_sum: f64 = valences.iter().filter(|&&s| s > 0.0).sum();
        let negative_sum: f64 = valences.iter().filter(|&&s| s < 0.0).map(|s| s.abs()).sum();
        let total = positive_sum + negative_sum + neutral_count as f64;

        let (positive, negative, neutral) = if total > 0.0 {
            (
                positive_sum / total,
                negative_sum / total,
                neutral_count as f64 / total,
            )
        } else {
            (0.0, 0.0, 1.0)
        };

        CompoundScores {
            compound: normalize(valences.iter().sum()),
            positive,
            negative,
            neutral,
        }
    }

    /// Apply boosters and negations found in the preceding words
    fn apply_modifiers(&self, words: &[String], index: usize, mut score: f64) -> f64 {
        let start = index.saturating_sub(MODIFIER_WINDOW);

        for prev_word in &words[start..index] {
            if let Some(&factor) = self.boosters.get(prev_word) {
                score *= factor;
            }
            if self.negations.contains(prev_word) {
                score *= NEGATION_FACTOR;
            }
        }

        score.clamp(-MAX_VALENCE, MAX_VALENCE)
    }
}

impl Default for LexiconAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl CompoundModel for LexiconAnalyzer {
    fn compound(&self, text: &str) -> Result<CompoundScores, ModelError> {
        Ok(self.analyze(text))
    }
}

/// Strip punctuation, keeping apostrophes and hyphens inside words
pub(crate) fn clean_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '\'' || *c == '-')
        .collect::<String>()
        .trim_matches(|c| c == '\'' || c == '-')
        .to_lowercase()
}

/// Map an unbounded valence sum into (-1.0, 1.0)
fn normalize(score: f64) -> f64 {
    score / (score * score + ALPHA).sqrt()
}
