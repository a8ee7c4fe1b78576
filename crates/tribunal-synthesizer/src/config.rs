//! Synthesis configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Voice of the opener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Plain
    #[default]
    Neutral,
    /// Report-like
    Formal,
    /// Conversational
    Friendly,
}

impl Tone {
    /// Opening phrase for this tone
    pub fn opener(&self) -> &'static str {
        match self {
            Tone::Neutral => "Verified findings:",
            Tone::Formal => "The tribunal finds as follows:",
            Tone::Friendly => "Here's what checks out:",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tone::Neutral => write!(f, "neutral"),
            Tone::Formal => write!(f, "formal"),
            Tone::Friendly => write!(f, "friendly"),
        }
    }
}

/// Layout of the facts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    /// One line, facts separated by spaces
    #[default]
    Concise,
    /// One bullet per fact
    Detailed,
}

/// Synthesis configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Opener tone
    pub tone: Tone,
    /// Fact layout
    pub style: Style,
}
