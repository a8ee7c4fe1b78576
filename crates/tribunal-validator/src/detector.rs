//! Gated pairwise contradiction detection

use crate::embedding::{cosine_similarity, EmbeddingModel, HashedEmbeddingModel};
use crate::{ValidatorConfig, ValidatorError};
use std::fmt;
use tracing::{debug, info};
use tribunal_domain::{ContradictionLikelihood, Label, Premise, TierTwoResult};

/// Cheap signals evaluated before deciding to run Tier-2
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateSignals<'a> {
    /// Raw query text
    pub input: &'a str,
    /// Contradictions already known (Tier-1 disagreements)
    pub prior_contradictions: usize,
    /// Likelihood declared for this run
    pub likelihood: ContradictionLikelihood,
    /// Mean Tier-1 confidence, if anything was answered
    pub mean_confidence: Option<f64>,
}

/// Reason the Tier-2 check was entered
#[derive(Debug, Clone, PartialEq)]
pub enum Tier2Trigger {
    /// A trigger keyword appears in the input
    Keyword(String),
    /// Tier-1 already found contradictions
    PriorContradictions(usize),
    /// The run declared elevated contradiction likelihood
    ElevatedLikelihood,
    /// Ensemble confidence fell below the threshold
    LowConfidence(f64),
}

impl fmt::Display for Tier2Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier2Trigger::Keyword(word) => write!(f, "keyword '{word}'"),
            Tier2Trigger::PriorContradictions(n) => write!(f, "{n} prior contradictions"),
            Tier2Trigger::ElevatedLikelihood => write!(f, "elevated likelihood"),
            Tier2Trigger::LowConfidence(c) => write!(f, "low confidence {c:.2}"),
        }
    }
}

/// Tier-2 validator
pub struct ContradictionDetector {
    config: ValidatorConfig,
    model: Box<dyn EmbeddingModel>,
}

impl fmt::Debug for ContradictionDetector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContradictionDetector")
            .field("config", &self.config)
            .field("dimension", &self.model.dimension())
            .finish()
    }
}

impl ContradictionDetector {
    /// Create a detector using the hashed embedding model
    pub fn new(config: ValidatorConfig) -> Self {
        let model = HashedEmbeddingModel::new(config.embedding_dimension);
        Self::with_model(config, Box::new(model))
    }

    /// Create a detector with a custom embedding model
    pub fn with_model(config: ValidatorConfig, model: Box<dyn EmbeddingModel>) -> Self {
        Self { config, model }
    }

    /// Get the configuration
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// First signal that makes Tier-2 worth running, if any
    ///
    /// Checked in order: keywords, prior contradictions, declared
    /// likelihood, ensemble confidence.
    pub fn trigger(&self, signals: &GateSignals<'_>) -> Option<Tier2Trigger> {
        let keyword = signals
            .input
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .find(|word| self.config.trigger_keywords.iter().any(|k| k == word));
        if let Some(word) = keyword {
            return Some(Tier2Trigger::Keyword(word));
        }

        if signals.prior_contradictions > 0 {
            return Some(Tier2Trigger::PriorContradictions(signals.prior_contradictions));
        }

        if signals.likelihood == ContradictionLikelihood::Elevated {
            return Some(Tier2Trigger::ElevatedLikelihood);
        }

        match signals.mean_confidence {
            Some(c) if c < self.config.low_confidence_threshold => {
                Some(Tier2Trigger::LowConfidence(c))
            }
            _ => None,
        }
    }

    /// Compare every pair of claims
    pub fn detect(&self, claims: &[Premise]) -> Result<TierTwoResult, ValidatorError> {
        let result = self.compare(claims, self.config.similarity_threshold, false)?;
        info!(
            claims = claims.len(),
            contradictions = result.contradictions.len(),
            score = result.score,
            "tier-2 check complete"
        );
        Ok(result)
    }

    /// Re-check under narrowed assumptions
    ///
    /// Pairs involving an uncertain claim count as resolved, and the looser
    /// narrowed similarity threshold applies. The caller decides whether a
    /// retry is still allowed.
    pub fn narrowed_retry(&self, claims: &[Premise]) -> Result<TierTwoResult, ValidatorError> {
        let result = self.compare(claims, self.config.narrowed_similarity_threshold, true)?;
        info!(
            contradictions = result.contradictions.len(),
            resolved = result.accepted,
            "narrowed retry complete"
        );
        Ok(result)
    }

    fn compare(
        &self,
        claims: &[Premise],
        threshold: f64,
        skip_uncertain: bool,
    ) -> Result<TierTwoResult, ValidatorError> {
        let embeddings = claims
            .iter()
            .map(|claim| {
                let embedding = self.model.embed(&claim.text)?;
                if embedding.len() != self.model.dimension() {
                    return Err(ValidatorError::DimensionMismatch {
                        expected: self.model.dimension(),
                        actual: embedding.len(),
                    });
                }
                Ok(embedding)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut contradictions = Vec::new();
        let mut comparisons = 0;
        for i in 0..claims.len() {
            for j in (i + 1)..claims.len() {
                let (a, b) = (&claims[i], &claims[j]);
                if skip_uncertain && (a.label == Label::Uncertain || b.label == Label::Uncertain) {
                    continue;
                }
                comparisons += 1;

                let similarity = cosine_similarity(&embeddings[i], &embeddings[j]) as f64;
                if similarity < threshold {
                    debug!(a = %a.text, b = %b.text, similarity, "semantic divergence");
                    contradictions.push(format!(
                        "semantic divergence: '{}' vs '{}' (similarity {:.3})",
                        a.text, b.text, similarity
                    ));
                } else if a.label != b.label {
                    debug!(a = %a.text, b = %b.text, "label conflict");
                    contradictions.push(format!(
                        "label conflict: '{}' ({}) vs '{}' ({})",
                        a.text, a.label, b.text, b.label
                    ));
                }
            }
        }

        Ok(TierTwoResult::derive(contradictions, comparisons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn detector() -> ContradictionDetector {
        ContradictionDetector::new(ValidatorConfig::default())
    }

    fn signals(input: &str) -> GateSignals<'_> {
        GateSignals {
            input,
            prior_contradictions: 0,
            likelihood: ContradictionLikelihood::Normal,
            mean_confidence: Some(0.9),
        }
    }

    #[test]
    fn test_gate_closed_for_plain_input() {
        assert_eq!(detector().trigger(&signals("The sky is blue.")), None);
    }

    #[test]
    fn test_gate_keyword() {
        assert_eq!(
            detector().trigger(&signals("Prove that the sky is blue.")),
            Some(Tier2Trigger::Keyword("prove".to_string()))
        );
        // Substrings do not count
        assert_eq!(detector().trigger(&signals("Reasonable people agree.")), None);
    }

    #[test]
    fn test_gate_other_signals() {
        let detector = detector();

        let prior = GateSignals {
            prior_contradictions: 2,
            ..signals("plain")
        };
        assert_eq!(detector.trigger(&prior), Some(Tier2Trigger::PriorContradictions(2)));

        let elevated = GateSignals {
            likelihood: ContradictionLikelihood::Elevated,
            ..signals("plain")
        };
        assert_eq!(detector.trigger(&elevated), Some(Tier2Trigger::ElevatedLikelihood));

        let low = GateSignals {
            mean_confidence: Some(0.2),
            ..signals("plain")
        };
        assert_eq!(detector.trigger(&low), Some(Tier2Trigger::LowConfidence(0.2)));

        let unanswered = GateSignals {
            mean_confidence: None,
            ..signals("plain")
        };
        assert_eq!(detector.trigger(&unanswered), None);
    }

    #[test]
    fn test_identical_claims_with_same_label_accepted() {
        let claims = vec![
            Premise::new("The sky is blue", Label::True),
            Premise::new("the SKY is blue", Label::True),
        ];
        let result = detector().detect(&claims).unwrap();
        assert!(result.accepted);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.disagreement_rate, 0.0);
    }

    #[test]
    fn test_label_conflict() {
        let claims = vec![
            Premise::new("The sky is blue", Label::True),
            Premise::new("The sky is blue", Label::False),
        ];
        let result = detector().detect(&claims).unwrap();
        assert_eq!(result.contradictions.len(), 1);
        assert!(result.contradictions[0].starts_with("label conflict"));
        assert_eq!(result.score, 100.0 - 10.0 - 25.0);
    }

    #[test]
    fn test_semantic_divergence() {
        let claims = vec![
            Premise::new("The engine is deterministic", Label::True),
            Premise::new("It never calls external APIs", Label::False),
            Premise::new("Maybe it caches every decision", Label::Uncertain),
        ];
        let result = detector().detect(&claims).unwrap();
        assert_eq!(result.contradictions.len(), 3);
        assert!(result
            .contradictions
            .iter()
            .all(|c| c.starts_with("semantic divergence")));
        assert_eq!(result.disagreement_rate, 1.0);
        assert_eq!(result.score, 100.0 - 30.0 - 25.0);
    }

    #[test]
    fn test_single_claim_has_no_comparisons() {
        let claims = vec![Premise::new("Alone", Label::True)];
        let result = detector().detect(&claims).unwrap();
        assert!(result.accepted);
        assert_eq!(result.disagreement_rate, 0.0);
    }

    #[test]
    fn test_narrowed_retry_resolves_uncertain_pairs() {
        let claims = vec![
            Premise::new("The sky is blue", Label::True),
            Premise::new("Maybe the sky is blue", Label::Uncertain),
        ];
        let detector = detector();

        assert!(!detector.detect(&claims).unwrap().accepted);
        assert!(detector.narrowed_retry(&claims).unwrap().accepted);
    }

    #[test]
    fn test_narrowed_retry_keeps_hard_conflicts() {
        let claims = vec![
            Premise::new("The sky is blue", Label::True),
            Premise::new("The sky is blue", Label::False),
        ];
        assert!(!detector().narrowed_retry(&claims).unwrap().accepted);
    }

    fn label() -> impl Strategy<Value = Label> {
        prop_oneof![Just(Label::True), Just(Label::False), Just(Label::Uncertain)]
    }

    proptest! {
        /// Property: derived fields stay in range and agree with each other
        #[test]
        fn test_result_ranges(
            claims in prop::collection::vec(("[a-z]{1,8}( [a-z]{1,8}){0,4}", label()), 0..8),
        ) {
            let claims: Vec<Premise> = claims
                .into_iter()
                .map(|(text, label)| Premise::new(text, label))
                .collect();
            let n = claims.len();
            let result = detector().detect(&claims).unwrap();

            prop_assert!((0.0..=100.0).contains(&result.score));
            prop_assert!((0.0..=1.0).contains(&result.disagreement_rate));
            prop_assert_eq!(result.accepted, result.contradictions.is_empty());
            prop_assert!(result.contradictions.len() <= n * n.saturating_sub(1) / 2);
        }
    }
}
