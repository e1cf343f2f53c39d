//! Keyword scoring and the decision policy.
//!
//! Each keyword counts at most once per side, matched as a case-insensitive
//! substring ("risk" also matches inside "brisk"). Equal scores, including
//! 0–0, resolve to `Abstain`.

use serde::Serialize;

use crate::domain::{Decision, KeywordSets};

/// Scores behind a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub decision: Decision,
    pub positive_score: usize,
    pub negative_score: usize,
}

/// Deterministic text → decision mapping
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    keywords: KeywordSets,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(KeywordSets::governance())
    }
}

impl DecisionEngine {
    pub fn new(keywords: KeywordSets) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &KeywordSets {
        &self.keywords
    }

    /// Score `analysis` and apply the tie-break policy
    pub fn evaluate(&self, analysis: &str) -> Verdict {
        let text = analysis.to_lowercase();
        let positive_score = distinct_matches(&text, self.keywords.positive());
        let negative_score = distinct_matches(&text, self.keywords.negative());

        Verdict {
            decision: decide(positive_score, negative_score),
            positive_score,
            negative_score,
        }
    }

    /// Just the decision
    pub fn decide(&self, analysis: &str) -> Decision {
        self.evaluate(analysis).decision
    }
}

fn distinct_matches(text: &str, keywords: &[String]) -> usize {
    keywords.iter().filter(|k| text.contains(k.as_str())).count()
}

fn decide(positive: usize, negative: usize) -> Decision {
    use std::cmp::Ordering;

    match positive.cmp(&negative) {
        Ordering::Greater => Decision::For,
        Ordering::Less => Decision::Against,
        Ordering::Equal => Decision::Abstain,
    }
}
