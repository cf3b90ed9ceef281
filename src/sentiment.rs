//! Lexicon sentiment scoring.
//!
//! Valence lexicon (JSON, embedded at build time) plus the usual heuristics:
//! negation in the preceding three tokens, booster/dampener words, ALL-CAPS
//! emphasis in mixed-case text, the contrastive "but", and trailing `!`.
//! The summed valence is squashed into a compound score in <-1.0, 1.0>.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::item::SentimentScore;

static LEXICON: Lazy<HashMap<String, f32>> = Lazy::new(|| {
    let raw = include_str!("../sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, f32>>(raw).expect("valid sentiment lexicon")
});

/// Squash constant: compound = s / sqrt(s² + ALPHA).
const ALPHA: f32 = 15.0;
const NEGATION_SCALAR: f32 = -0.74;
const BOOST_INCR: f32 = 0.293;
const CAPS_INCR: f32 = 0.733;
const EXCLAIM_INCR: f32 = 0.292;

/// Anything that can turn text into a [`SentimentScore`].
pub trait Scorer: Send + Sync {
    fn score(&self, text: &str) -> SentimentScore;
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Lexicon valence for a lowercased word (0 when unknown).
    #[inline]
    fn word_valence(&self, w: &str) -> f32 {
        *LEXICON.get(w).unwrap_or(&0.0)
    }

    /// Per-token valences after negation/booster/caps adjustments.
    fn valences(&self, tokens: &[&str]) -> Vec<f32> {
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
        let caps_differential = is_caps_differential(tokens);
        let mut out = Vec::with_capacity(tokens.len());

        for (i, raw) in tokens.iter().enumerate() {
            let w = lowered[i].as_str();
            let base = self.word_valence(w);
            if base == 0.0 || booster(w).is_some() {
                out.push(0.0);
                continue;
            }

            let mut v = base;
            if caps_differential && is_all_caps(raw) {
                v += CAPS_INCR * base.signum();
            }

            // boosters decay with distance
            for (k, decay) in [(1usize, 1.0f32), (2, 0.95), (3, 0.9)] {
                if i >= k {
                    if let Some(b) = booster(&lowered[i - k]) {
                        v += b * decay * v.signum();
                    }
                }
            }

            // is there a negator in the last 1..=3 tokens?
            let negated = (1..=3).any(|k| i >= k && is_negator(&lowered[i - k]));
            if negated {
                v *= NEGATION_SCALAR;
            }
            out.push(v);
        }

        // "but": what follows dominates what precedes
        if let Some(bi) = lowered.iter().position(|t| t == "but") {
            for (j, v) in out.iter_mut().enumerate() {
                if j < bi {
                    *v *= 0.5;
                } else if j > bi {
                    *v *= 1.5;
                }
            }
        }
        out
    }
}

impl Scorer for SentimentAnalyzer {
    fn score(&self, text: &str) -> SentimentScore {
        let tokens: Vec<&str> = tokenize(text).collect();
        if tokens.is_empty() {
            return SentimentScore::neutral();
        }
        let vals = self.valences(&tokens);

        let mut sum: f32 = vals.iter().sum();
        let bangs = text.chars().filter(|&c| c == '!').count().min(4) as f32;
        if sum > 0.0 {
            sum += bangs * EXCLAIM_INCR;
        } else if sum < 0.0 {
            sum -= bangs * EXCLAIM_INCR;
        }
        let compound = (sum / (sum * sum + ALPHA).sqrt()).clamp(-1.0, 1.0);

        let mut pos = 0.0f32;
        let mut neg = 0.0f32;
        let mut neu = 0.0f32;
        for v in vals {
            if v > 0.0 {
                pos += v + 1.0;
            } else if v < 0.0 {
                neg += -v + 1.0;
            } else {
                neu += 1.0;
            }
        }
        let total = pos + neg + neu;

        SentimentScore {
            compound,
            positive: pos / total,
            negative: neg / total,
            neutral: neu / total,
        }
    }
}

/// Word tokens (alphanumerics and inner apostrophes), original case.
fn tokenize(s: &str) -> impl Iterator<Item = &str> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
}

fn is_all_caps(t: &str) -> bool {
    t.chars().count() > 1
        && t.chars().any(char::is_alphabetic)
        && t.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
}

/// True when some, but not all, words are shouted.
fn is_caps_differential(tokens: &[&str]) -> bool {
    let caps = tokens.iter().filter(|t| is_all_caps(t)).count();
    caps > 0 && caps < tokens.len()
}

/// Intensity modifier for the next word, if `tok` is one.
fn booster(tok: &str) -> Option<f32> {
    match tok {
        "very" | "extremely" | "really" | "highly" | "hugely" | "incredibly" | "deeply"
        | "particularly" | "especially" | "totally" | "utterly" | "so" | "most" | "absolutely" => {
            Some(BOOST_INCR)
        }
        "slightly" | "somewhat" | "barely" | "hardly" | "marginally" | "partly" | "kinda"
        | "less" => Some(-BOOST_INCR),
        _ => None,
    }
}

/// Single-token negators; "no longer" is covered by "no".
fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "nor"
            | "none"
            | "nothing"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "weren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}
