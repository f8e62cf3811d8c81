// src/sentiment.rs
//! Lexicon/rule-based polarity scorer and the three-way label threshold.
//!
//! The lexicon is English-derived; Indonesian tokens not present in it score 0.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, fs, path::Path, str::FromStr, sync::Arc};
use tracing::warn;

static EMBEDDED_LEXICON: Lazy<Arc<HashMap<String, f64>>> = Lazy::new(|| {
    let raw = include_str!("../data/sentiment_lexicon.json");
    Arc::new(parse_lexicon(raw).expect("valid sentiment lexicon"))
});

/// Booster/dampener step, scaled down with distance to the sentiment word.
const BOOST_STEP: f64 = 0.293;
const DISTANCE_DECAY: [f64; 3] = [1.0, 0.95, 0.90];
const NEGATION_SCALAR: f64 = -0.74;
const BEFORE_BUT: f64 = 0.5;
const AFTER_BUT: f64 = 1.5;
const EXCLAIM_STEP: f64 = 0.292;
const EXCLAIM_CAP: usize = 4;
const QUESTION_STEP: f64 = 0.18;
const QUESTION_MAX: f64 = 0.96;
const NORMALIZE_ALPHA: f64 = 15.0;

pub const POSITIVE_THRESHOLD: f64 = 0.05;
pub const NEGATIVE_THRESHOLD: f64 = -0.05;

fn parse_lexicon(raw: &str) -> Result<HashMap<String, f64>> {
    let map: HashMap<String, f64> = serde_json::from_str(raw)?;
    Ok(map
        .into_iter()
        .map(|(k, v)| (k.trim().to_lowercase(), v))
        .filter(|(k, _)| !k.is_empty())
        .collect())
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Arc<HashMap<String, f64>>,
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::embedded()
    }
}

impl SentimentAnalyzer {
    pub fn embedded() -> Self {
        Self {
            lexicon: Arc::clone(&EMBEDDED_LEXICON),
        }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(Self {
            lexicon: Arc::new(parse_lexicon(raw)?),
        })
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading sentiment lexicon from {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn load_or_embedded(path: Option<&Path>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!(
                    target: "lexicon",
                    error = %format!("{e:#}"),
                    "sentiment lexicon override unusable, using embedded"
                );
                Self::embedded()
            }),
            None => Self::embedded(),
        }
    }

    #[inline]
    fn valence(&self, w: &str) -> Option<f64> {
        self.lexicon.get(w).copied()
    }

    /// Compound polarity in [-1, 1], rounded to 4 decimals. Empty text scores exactly 0.
    pub fn score(&self, text: &str) -> f64 {
        let tokens: Vec<String> = tokenize(text).collect();
        if tokens.is_empty() {
            return 0.0;
        }

        let mut valences: Vec<(usize, f64)> = Vec::new();
        for (i, tok) in tokens.iter().enumerate() {
            if booster_scalar(tok).is_some() {
                continue;
            }
            let Some(base) = self.valence(tok) else {
                continue;
            };
            let mut v = base;
            for (k, decay) in DISTANCE_DECAY.iter().enumerate() {
                let Some(prev) = i.checked_sub(k + 1).map(|j| tokens[j].as_str()) else {
                    break;
                };
                if let Some(s) = booster_scalar(prev) {
                    let adj = s * decay;
                    v += if base < 0.0 { -adj } else { adj };
                }
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(&tokens[i - k]));
            if negated {
                v *= NEGATION_SCALAR;
            }
            valences.push((i, v));
        }

        if let Some(but) = tokens.iter().position(|t| t == "but") {
            for (i, v) in valences.iter_mut() {
                if *i < but {
                    *v *= BEFORE_BUT;
                } else if *i > but {
                    *v *= AFTER_BUT;
                }
            }
        }

        let mut sum: f64 = valences.iter().map(|(_, v)| v).sum();
        if sum == 0.0 {
            return 0.0;
        }
        let emphasis = punctuation_emphasis(text);
        if sum > 0.0 {
            sum += emphasis;
        } else {
            sum -= emphasis;
        }

        let compound = (sum / (sum * sum + NORMALIZE_ALPHA).sqrt()).clamp(-1.0, 1.0);
        (compound * 10_000.0).round() / 10_000.0
    }

    /// Score plus label in one call.
    pub fn analyze(&self, text: &str) -> (f64, SentimentLabel) {
        let s = self.score(text);
        (s, SentimentLabel::from_score(s))
    }

    pub fn lexicon_len(&self) -> usize {
        self.lexicon.len()
    }
}

/// Whitespace tokens, lowercased, with surrounding punctuation removed (apostrophes kept).
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

fn punctuation_emphasis(text: &str) -> f64 {
    let bangs = text.matches('!').count().min(EXCLAIM_CAP);
    let questions = text.matches('?').count();
    let q = match questions {
        0 | 1 => 0.0,
        2 | 3 => questions as f64 * QUESTION_STEP,
        _ => QUESTION_MAX,
    };
    bangs as f64 * EXCLAIM_STEP + q
}

fn booster_scalar(tok: &str) -> Option<f64> {
    match tok {
        "very" | "really" | "extremely" | "so" | "absolutely" | "totally" | "incredibly"
        | "super" | "most" | "more" | "highly" | "truly" | "completely" => Some(BOOST_STEP),
        "slightly" | "somewhat" | "barely" | "hardly" | "kinda" | "little" | "less"
        | "marginally" | "partly" => Some(-BOOST_STEP),
        _ => None,
    }
}

fn is_negator(tok: &str) -> bool {
    tok.ends_with("n't")
        || matches!(
            tok,
            "not" | "no" | "never" | "nothing" | "nobody" | "none" | "neither" | "nor"
                | "cannot" | "without" | "nope" | "dont" | "doesnt" | "didnt" | "isnt"
                | "wasnt" | "arent" | "cant" | "wont"
        )
}

/// The three fixed labels. Serialized with the dataset's own strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Positif")]
    Positive,
    #[serde(rename = "Netral")]
    Neutral,
    #[serde(rename = "Negatif")]
    Negative,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
    ];

    /// `>= 0.05` positive, then `<= -0.05` negative, otherwise neutral (NaN included).
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if score <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positif",
            SentimentLabel::Neutral => "Netral",
            SentimentLabel::Negative => "Negatif",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLabelError(pub String);

impl fmt::Display for ParseLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sentiment label `{}`", self.0)
    }
}

impl std::error::Error for ParseLabelError {}

impl FromStr for SentimentLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positif" | "positive" => Ok(SentimentLabel::Positive),
            "netral" | "neutral" => Ok(SentimentLabel::Neutral),
            "negatif" | "negative" => Ok(SentimentLabel::Negative),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a() -> SentimentAnalyzer {
        SentimentAnalyzer::embedded()
    }

    #[test]
    fn empty_and_unknown_text_score_zero() {
        assert_eq!(a().score(""), 0.0);
        assert_eq!(a().score("   "), 0.0);
        assert_eq!(a().score("chatgpt bantu kerja"), 0.0);
    }

    #[test]
    fn polarity_direction_follows_lexicon() {
        assert!(a().score("good") > 0.0);
        assert!(a().score("bad") < 0.0);
        assert_eq!(a().analyze("great").1, SentimentLabel::Positive);
    }

    #[test]
    fn single_word_compound_matches_formula() {
        let v = 1.9_f64; // "good"
        let expected = ((v / (v * v + 15.0).sqrt()) * 10_000.0).round() / 10_000.0;
        assert_eq!(a().score("good"), expected);
    }

    #[test]
    fn negation_flips_and_damps() {
        let plain = a().score("good");
        let negated = a().score("not good");
        assert!(negated < 0.0);
        assert!(negated.abs() < plain.abs());
        assert!(a().score("isn't good") < 0.0);
    }

    #[test]
    fn boosters_and_emphasis_increase_magnitude() {
        assert!(a().score("very good") > a().score("good"));
        assert!(a().score("good!!") > a().score("good"));
        assert!(a().score("bad!!") < a().score("bad"));
        assert!(a().score("slightly good") < a().score("good"));
    }

    #[test]
    fn but_shifts_weight_to_the_second_clause() {
        assert!(a().score("good but bad") < 0.0);
        assert!(a().score("bad but good") > 0.0);
    }

    #[test]
    fn score_is_bounded_and_rounded() {
        let s = a().score("love love love love great great best awesome!!!!!!");
        assert!(s <= 1.0 && s > 0.9);
        assert_eq!(s, (s * 10_000.0).round() / 10_000.0);
    }

    #[test]
    fn labels_parse_both_languages() {
        assert_eq!("Positif".parse::<SentimentLabel>().unwrap(), SentimentLabel::Positive);
        assert_eq!("negative".parse::<SentimentLabel>().unwrap(), SentimentLabel::Negative);
        assert_eq!(" NETRAL ".parse::<SentimentLabel>().unwrap(), SentimentLabel::Neutral);
        assert!("meh".parse::<SentimentLabel>().is_err());
        assert_eq!(
            serde_json::to_string(&SentimentLabel::Negative).unwrap(),
            "\"Negatif\""
        );
    }

    #[test]
    fn nan_is_neutral() {
        assert_eq!(SentimentLabel::from_score(f64::NAN), SentimentLabel::Neutral);
    }
}
