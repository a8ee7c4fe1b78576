//! Tribunal Synthesizer (ALOE)
//!
//! Turns verified facts into readable text without changing what they say.
//!
//! # Passes
//!
//! 1. **Policy pre-pass**: trims each fact, drops blank ones, orders them
//! 2. **Layout**: concise (space-joined) or detailed (bulleted)
//! 3. **Tone post-pass**: prefixes a tone-dependent opener
//!
//! Every non-blank fact appears verbatim (after trimming) in the output.
//!
//! # Examples
//!
//! ```
//! use tribunal_synthesizer::{Style, SynthesisConfig, Synthesizer, Tone};
//!
//! let synthesizer = Synthesizer::new(SynthesisConfig {
//!     tone: Tone::Neutral,
//!     style: Style::Detailed,
//! });
//! let text = synthesizer.synthesize(&["b is true".to_string(), "a is true".to_string()]);
//! assert_eq!(text, "Verified findings:\n- a is true\n- b is true");
//! ```

#![warn(missing_docs)]

mod config;
mod synthesizer;

pub use config::{Style, SynthesisConfig, Tone};
pub use synthesizer::Synthesizer;
