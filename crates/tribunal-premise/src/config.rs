//! Configuration for the Premise Structurer

use serde::{Deserialize, Serialize};

/// Which label rule the structurer uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelRuleKind {
    /// Keyword lookup (negation ⇒ false, hedging ⇒ uncertain)
    #[default]
    Keyword,
    /// Even claim length ⇒ true, odd ⇒ false
    LengthParity,
}

/// Configuration for premise structuring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PremiseConfig {
    /// Rule used to label claims
    pub label_rule: LabelRuleKind,

    /// Words that make a claim false
    pub negation_keywords: Vec<String>,

    /// Words that make a claim uncertain (checked before negation)
    pub uncertainty_keywords: Vec<String>,
}

impl Default for PremiseConfig {
    fn default() -> Self {
        Self {
            label_rule: LabelRuleKind::Keyword,
            negation_keywords: vec!["never".to_string()],
            uncertainty_keywords: vec!["maybe".to_string(), "uncertain".to_string()],
        }
    }
}

impl PremiseConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        let blank = self
            .negation_keywords
            .iter()
            .chain(&self.uncertainty_keywords)
            .any(|k| k.trim().is_empty());
        if blank {
            return Err("label keywords must not be blank".to_string());
        }
        Ok(())
    }
}
