// src/gate.rs
//! Coarse content filter run before summarization: items whose best text
//! scores below the threshold are tombstoned.

use metrics::counter;

use crate::item::{NewsItem, SentimentScore};
use crate::sentiment::{Scorer, SentimentAnalyzer};

pub const DEFAULT_THRESHOLD: f32 = -0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateOutcome {
    Passed(SentimentScore),
    Rejected(SentimentScore),
}

impl GateOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    pub fn score(&self) -> SentimentScore {
        match self {
            Self::Passed(s) | Self::Rejected(s) => *s,
        }
    }
}

pub struct SentimentGate {
    scorer: Box<dyn Scorer>,
    threshold: f32,
    enabled: bool,
}

impl Default for SentimentGate {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SentimentGate {
    /// Lexicon scorer with the given cutoff.
    pub fn new(threshold: f32) -> Self {
        Self::with_scorer(Box::new(SentimentAnalyzer::new()), threshold)
    }

    pub fn with_scorer(scorer: Box<dyn Scorer>, threshold: f32) -> Self {
        Self {
            scorer,
            threshold: threshold.clamp(-1.0, 1.0),
            enabled: true,
        }
    }

    /// A disabled gate still scores items but never rejects.
    pub fn enabled(mut self, on: bool) -> Self {
        self.enabled = on;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Score `item` (body, else summary, else title), store the score on it and
    /// decide whether it continues down the pipeline.
    pub fn evaluate(&self, item: &mut NewsItem) -> GateOutcome {
        let score = self.scorer.score(item.best_text());
        item.sentiment = Some(score);

        if self.enabled && score.compound < self.threshold {
            counter!("gate_rejected_total").increment(1);
            tracing::info!(
                target: "gate",
                url = %item.url,
                compound = score.compound,
                threshold = self.threshold,
                "item rejected by sentiment gate"
            );
            return GateOutcome::Rejected(score);
        }
        tracing::debug!(target: "gate", url = %item.url, compound = score.compound, "passed");
        GateOutcome::Passed(score)
    }
}
