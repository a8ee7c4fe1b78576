//! Premise module - the atomic claim every tier reasons about

use serde::{Deserialize, Serialize};
use std::fmt;

/// Truth label attached to a premise by the structuring rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// The clause asserts something
    True,

    /// The clause negates something
    False,

    /// The clause hedges
    Uncertain,
}

impl Label {
    /// Get the label name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::True => "true",
            Label::False => "false",
            Label::Uncertain => "uncertain",
        }
    }

    /// Parse a label from a string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "true" => Some(Label::True),
            "false" => Some(Label::False),
            "uncertain" => Some(Label::Uncertain),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Label {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid label: {}", s))
    }
}

/// A premise - one atomic clause of the query
///
/// Premises are immutable once produced by the structurer; the label is a
/// deterministic function of the text and is never stored anywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Premise {
    /// Trimmed clause text
    pub text: String,

    /// Label assigned by the structuring rule
    pub label: Label,
}

impl Premise {
    /// Create a new premise
    pub fn new(text: impl Into<String>, label: Label) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}
