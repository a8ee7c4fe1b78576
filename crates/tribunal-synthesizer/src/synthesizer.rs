//! Synthesis passes

use crate::{Style, SynthesisConfig};
use serde_json::Value;

/// Text shown when there is nothing verified to report
pub const NO_FACTS: &str = "No verified facts.";

/// Formats verified facts
#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer {
    config: SynthesisConfig,
}

impl Synthesizer {
    /// Create a synthesizer
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Run all passes over a fact list
    pub fn synthesize(&self, facts: &[String]) -> String {
        let facts = self.policy_pass(facts);
        let body = self.layout(&facts);
        self.tone_pass(&body)
    }

    /// Synthesize from loosely-typed input
    ///
    /// Arrays are treated as fact lists (non-string elements are rendered as
    /// JSON). Anything else falls back to whitespace-joining its text.
    pub fn synthesize_value(&self, facts: &Value) -> String {
        match facts {
            Value::Array(items) => {
                let facts: Vec<String> = items
                    .iter()
                    .map(|item| match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                self.synthesize(&facts)
            }
            Value::String(s) => naive_join(s),
            other => {
                tracing::debug!("synthesis input is not a list, joining naively");
                naive_join(&other.to_string())
            }
        }
    }

    /// Trim, drop blanks, order
    fn policy_pass(&self, facts: &[String]) -> Vec<String> {
        let mut facts: Vec<String> = facts
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        facts.sort();
        facts
    }

    fn layout(&self, facts: &[String]) -> String {
        if facts.is_empty() {
            return NO_FACTS.to_string();
        }
        match self.config.style {
            Style::Concise => facts.join(" "),
            Style::Detailed => facts
                .iter()
                .map(|f| format!("- {f}"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn tone_pass(&self, body: &str) -> String {
        let separator = match self.config.style {
            Style::Concise => " ",
            Style::Detailed => "\n",
        };
        format!("{}{}{}", self.config.tone.opener(), separator, body)
    }
}

fn naive_join(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
