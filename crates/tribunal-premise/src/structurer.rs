//! Memoized premise structuring

use crate::rules::rule_from_config;
use crate::{split_claims, LabelRule, PremiseConfig};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tribunal_domain::Premise;

/// Splits input into labeled claims, caching by exact input string
#[derive(Debug)]
pub struct PremiseStructurer {
    rule: Box<dyn LabelRule>,
    memo: Mutex<HashMap<String, Arc<Vec<Premise>>>>,
}

impl PremiseStructurer {
    /// Create a structurer with the given label rule
    pub fn new(rule: impl LabelRule + 'static) -> Self {
        Self::with_rule(Box::new(rule))
    }

    /// Create a structurer from a boxed rule
    pub fn with_rule(rule: Box<dyn LabelRule>) -> Self {
        Self {
            rule,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Create a structurer with the rule the configuration selects
    pub fn from_config(config: &PremiseConfig) -> Self {
        Self::with_rule(rule_from_config(config))
    }

    /// Name of the active label rule
    pub fn rule_name(&self) -> &str {
        self.rule.name()
    }

    /// Structure `input` into ordered, labeled claims
    ///
    /// The same input always yields the same `Arc`; the claims are computed
    /// at most once per distinct input.
    pub fn structure(&self, input: &str) -> Arc<Vec<Premise>> {
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(claims) = memo.get(input) {
            return Arc::clone(claims);
        }

        let claims: Vec<Premise> = split_claims(input)
            .into_iter()
            .map(|text| {
                let label = self.rule.label(&text);
                Premise::new(text, label)
            })
            .collect();
        tracing::debug!(claims = claims.len(), rule = self.rule.name(), "structured input");

        let claims = Arc::new(claims);
        memo.insert(input.to_string(), Arc::clone(&claims));
        claims
    }

    /// Number of memoized inputs
    pub fn cached_inputs(&self) -> usize {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Administrative reset of the memo table
    pub fn clear(&self) {
        self.memo
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Hex SHA-256 over the canonical JSON of a claim set
///
/// Identifies a structured claim set independent of the raw input it came
/// from: two inputs that structure identically share a fingerprint.
pub fn fingerprint_claims(claims: &[Premise]) -> String {
    // Serializing plain strings and enums cannot fail
    let encoded = serde_json::to_vec(claims).unwrap_or_default();
    hex::encode(Sha256::digest(&encoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{KeywordLabelRule, LabelRuleKind, LengthParityRule};
    use tribunal_domain::Label;

    const SCENARIO: &str =
        "The engine is deterministic. It never calls external APIs. Maybe it caches every decision.";

    #[test]
    fn test_structure_scenario() {
        let structurer = PremiseStructurer::new(KeywordLabelRule::default());
        let claims = structurer.structure(SCENARIO);

        let labels: Vec<Label> = claims.iter().map(|p| p.label).collect();
        assert_eq!(labels, vec![Label::True, Label::False, Label::Uncertain]);
        assert_eq!(claims[0].text, "The engine is deterministic");
    }

    #[test]
    fn test_structure_is_reference_identical() {
        let structurer = PremiseStructurer::new(KeywordLabelRule::default());
        let first = structurer.structure(SCENARIO);
        let second = structurer.structure(SCENARIO);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(structurer.cached_inputs(), 1);
    }

    #[test]
    fn test_empty_input() {
        let structurer = PremiseStructurer::new(KeywordLabelRule::default());
        assert!(structurer.structure("").is_empty());
    }

    #[test]
    fn test_clear_recomputes() {
        let structurer = PremiseStructurer::new(KeywordLabelRule::default());
        let first = structurer.structure(SCENARIO);
        structurer.clear();
        let second = structurer.structure(SCENARIO);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_from_config_selects_rule() {
        let config = PremiseConfig {
            label_rule: LabelRuleKind::LengthParity,
            ..Default::default()
        };
        let structurer = PremiseStructurer::from_config(&config);
        assert_eq!(structurer.rule_name(), "length_parity");

        let claims = structurer.structure("abcd. abc");
        assert_eq!(claims[0].label, LengthParityRule.label("abcd"));
        assert_eq!(claims[1].label, Label::False);
    }

    #[test]
    fn test_fingerprint_claims() {
        let structurer = PremiseStructurer::new(KeywordLabelRule::default());
        let a = structurer.structure("One. Two.");
        let b = structurer.structure("One!\nTwo");
        let c = structurer.structure("One. Three.");

        assert_eq!(fingerprint_claims(&a), fingerprint_claims(&b));
        assert_ne!(fingerprint_claims(&a), fingerprint_claims(&c));
        assert_eq!(fingerprint_claims(&a).len(), 64);
    }
}
