//! Label rules
//!
//! A label is a deterministic function of claim text. Neither rule here
//! understands language; both are heuristics kept swappable on purpose.

use crate::{LabelRuleKind, PremiseConfig};
use std::fmt::Debug;
use tribunal_domain::Label;

/// Deterministic claim labeling
pub trait LabelRule: Debug + Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Label a single trimmed claim
    fn label(&self, claim: &str) -> Label;
}

/// Keyword-based labeling
///
/// Any uncertainty keyword makes the claim uncertain; otherwise any
/// negation keyword makes it false; otherwise it is true. Words are
/// compared case-insensitively with surrounding punctuation stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordLabelRule {
    negation: Vec<String>,
    uncertainty: Vec<String>,
}

impl KeywordLabelRule {
    /// Create a rule from explicit keyword lists
    pub fn new(negation: Vec<String>, uncertainty: Vec<String>) -> Self {
        Self {
            negation: negation.into_iter().map(|k| k.to_lowercase()).collect(),
            uncertainty: uncertainty.into_iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    fn words(claim: &str) -> impl Iterator<Item = String> + '_ {
        claim
            .split_whitespace()
            .map(|w| {
                w.trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase()
            })
            .filter(|w| !w.is_empty())
    }
}

impl Default for KeywordLabelRule {
    fn default() -> Self {
        let config = PremiseConfig::default();
        Self::new(config.negation_keywords, config.uncertainty_keywords)
    }
}

impl LabelRule for KeywordLabelRule {
    fn name(&self) -> &str {
        "keyword"
    }

    fn label(&self, claim: &str) -> Label {
        let words: Vec<String> = Self::words(claim).collect();
        if words.iter().any(|w| self.uncertainty.contains(w)) {
            Label::Uncertain
        } else if words.iter().any(|w| self.negation.contains(w)) {
            Label::False
        } else {
            Label::True
        }
    }
}

/// Labels by parity of the claim's character count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LengthParityRule;

impl LabelRule for LengthParityRule {
    fn name(&self) -> &str {
        "length_parity"
    }

    fn label(&self, claim: &str) -> Label {
        if claim.chars().count() % 2 == 0 {
            Label::True
        } else {
            Label::False
        }
    }
}

/// Build the rule a configuration selects
pub(crate) fn rule_from_config(config: &PremiseConfig) -> Box<dyn LabelRule> {
    match config.label_rule {
        LabelRuleKind::Keyword => Box::new(KeywordLabelRule::new(
            config.negation_keywords.clone(),
            config.uncertainty_keywords.clone(),
        )),
        LabelRuleKind::LengthParity => Box::new(LengthParityRule),
    }
}
