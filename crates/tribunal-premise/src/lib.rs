//! Tribunal Premise Structurer
//!
//! Splits raw input into labeled atomic claims.
//!
//! # Overview
//!
//! ```text
//! "A is B. It never C. Maybe D."
//!     → split on sentence boundaries
//!     → label each claim with a LabelRule
//!     → [A is B: true, It never C: false, Maybe D: uncertain]
//! ```
//!
//! Structuring is a pure function of the input string, memoized: repeated
//! calls with the same input return the same `Arc`.
//!
//! # Example Usage
//!
//! ```
//! use tribunal_premise::{KeywordLabelRule, PremiseStructurer};
//! use tribunal_domain::Label;
//!
//! let structurer = PremiseStructurer::new(KeywordLabelRule::default());
//! let claims = structurer.structure("The sky is blue. It never rains.");
//!
//! assert_eq!(claims.len(), 2);
//! assert_eq!(claims[0].label, Label::True);
//! assert_eq!(claims[1].label, Label::False);
//! ```

#![warn(missing_docs)]

mod config;
mod rules;
mod splitter;
mod structurer;

pub use config::{LabelRuleKind, PremiseConfig};
pub use rules::{KeywordLabelRule, LabelRule, LengthParityRule};
pub use splitter::split_claims;
pub use structurer::{fingerprint_claims, PremiseStructurer};
