//! Lexicon-based polarity scoring of scraped text.
//!
//! [`polarity_scores`] produces the four classic signals (`neg`, `neu`,
//! `pos`, `compound`). [`extract_signals`] reports which of those signals
//! clear the 0.2 threshold, which says something about the tone of a page but
//! nothing about its subject. [`salient_terms`] is the content-word variant:
//! it returns the page's own words whose lexicon valence clears the
//! threshold.
//!
//! Neither runs in the default pipeline; `--signals` opts in to a per-keyword
//! salient-term report.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Scores above this count as a signal.
pub const SIGNAL_THRESHOLD: f64 = 0.2;

/// Normalisation constant for the compound score.
const COMPOUND_ALPHA: f64 = 15.0;

/// Largest magnitude a lexicon entry can carry.
const MAX_VALENCE: f64 = 4.0;

/// Word valences on a `[-4, 4]` scale.
const LEXICON: &[(&str, f64)] = &[
    // Positive
    ("good", 1.9),
    ("great", 3.1),
    ("excellent", 2.7),
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("best", 3.2),
    ("better", 1.9),
    ("love", 3.2),
    ("loved", 2.9),
    ("happy", 2.7),
    ("nice", 1.8),
    ("clean", 1.7),
    ("benefit", 2.0),
    ("benefits", 1.6),
    ("improve", 1.9),
    ("improved", 2.1),
    ("success", 2.7),
    ("successful", 2.8),
    ("win", 2.8),
    ("free", 2.3),
    ("safe", 1.9),
    ("popular", 1.8),
    ("growth", 1.6),
    ("innovative", 1.9),
    ("efficient", 1.8),
    ("reliable", 1.9),
    ("useful", 1.9),
    ("helpful", 1.8),
    ("recommend", 1.5),
    ("easy", 1.9),
    ("fun", 2.3),
    ("strong", 1.5),
    ("thriving", 2.2),
    ("powerful", 1.8),
    // Negative
    ("bad", -2.5),
    ("terrible", -2.1),
    ("worst", -3.1),
    ("worse", -2.1),
    ("hate", -2.7),
    ("problem", -1.7),
    ("problems", -1.7),
    ("fail", -2.5),
    ("failed", -2.3),
    ("failure", -2.3),
    ("risk", -1.1),
    ("dangerous", -2.1),
    ("poor", -2.1),
    ("difficult", -1.5),
    ("expensive", -1.2),
    ("crisis", -3.1),
    ("loss", -1.3),
    ("damage", -2.2),
    ("broken", -2.0),
    ("waste", -1.8),
    ("scam", -2.9),
    ("warning", -1.4),
    ("concern", -1.4),
    ("ban", -2.6),
    ("illegal", -2.6),
    ("harmful", -2.6),
];

static LEXICON_MAP: Lazy<HashMap<&'static str, f64>> =
    Lazy::new(|| LEXICON.iter().copied().collect());

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// The four polarity signals for one piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolarityScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

impl PolarityScores {
    /// `(name, score)` pairs in a stable order.
    pub fn signals(&self) -> [(&'static str, f64); 4] {
        [
            ("neg", self.neg),
            ("neu", self.neu),
            ("pos", self.pos),
            ("compound", self.compound),
        ]
    }
}

/// Lowercase word tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

/// Score `text` against the lexicon.
///
/// Proportions (`neg`, `neu`, `pos`) sum to one for non-empty text; words not
/// in the lexicon count as neutral. `compound` is the valence sum squashed
/// into `[-1, 1]`. Empty text scores zero across the board.
pub fn polarity_scores(text: &str) -> PolarityScores {
    let mut sum = 0.0;
    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;

    for token in tokenize(text) {
        match LEXICON_MAP.get(token.as_str()) {
            Some(&v) if v > 0.0 => {
                sum += v;
                pos_sum += v + 1.0;
            }
            Some(&v) if v < 0.0 => {
                sum += v;
                neg_sum += v - 1.0;
            }
            _ => neu_count += 1.0,
        }
    }

    let total = pos_sum + neg_sum.abs() + neu_count;
    if total == 0.0 {
        return PolarityScores::default();
    }
    PolarityScores {
        neg: round3(neg_sum.abs() / total),
        neu: round3(neu_count / total),
        pos: round3(pos_sum / total),
        compound: round3(sum / (sum * sum + COMPOUND_ALPHA).sqrt()),
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

/// Names of the polarity signals of `content` scoring above
/// [`SIGNAL_THRESHOLD`]. Missing content has no signals.
pub fn extract_signals(content: Option<&str>) -> Vec<&'static str> {
    let Some(content) = content else {
        return Vec::new();
    };
    let joined = tokenize(content).join(" ");
    polarity_scores(&joined)
        .signals()
        .into_iter()
        .filter(|(_, score)| *score > SIGNAL_THRESHOLD)
        .map(|(name, _)| name)
        .collect()
}

/// Distinct words of `text`, first occurrence first, whose normalised lexicon
/// valence (in `[-1, 1]`) exceeds `threshold`.
pub fn salient_terms(text: &str, threshold: f64) -> Vec<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| {
            LEXICON_MAP
                .get(t.as_str())
                .is_some_and(|v| v / MAX_VALENCE > threshold)
        })
        .unique()
        .collect()
}
