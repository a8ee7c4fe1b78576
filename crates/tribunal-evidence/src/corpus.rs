//! In-memory keyword corpus
//!
//! Lets the evidence stage run without any network connector. Snippets
//! match a query when they share at least one keyword with it; keywords are
//! lowercase words of four or more characters.
//!
//! # File format
//!
//! ```toml
//! name = "handbook"
//!
//! [[snippets]]
//! content = "Water boils at 100 degrees Celsius at sea level."
//! reliability = 0.9
//! category = "physics"
//! url = "https://example.org/boiling"
//! ```

use crate::EvidenceError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tribunal_domain::{EvidenceSource, KnowledgeSnippet};

const MIN_KEYWORD_LEN: usize = 4;

#[derive(Debug, Deserialize)]
struct CorpusFile {
    name: String,
    #[serde(default)]
    snippets: Vec<CorpusEntry>,
}

#[derive(Debug, Deserialize)]
struct CorpusEntry {
    content: String,
    #[serde(default = "default_reliability")]
    reliability: f64,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    url: Option<String>,
}

fn default_reliability() -> f64 {
    1.0
}

fn default_category() -> String {
    "general".to_string()
}

/// Keyword-matched snippet list
#[derive(Debug, Clone, Default)]
pub struct CorpusSource {
    name: String,
    snippets: Vec<(KnowledgeSnippet, BTreeSet<String>)>,
}

impl CorpusSource {
    /// Create an empty corpus
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snippets: Vec::new(),
        }
    }

    /// Add a snippet; its source name is replaced with the corpus name
    pub fn with_snippet(mut self, mut snippet: KnowledgeSnippet) -> Self {
        snippet.source_name = self.name.clone();
        let keywords = keywords(&snippet.content);
        self.snippets.push((snippet, keywords));
        self
    }

    /// Add a snippet from plain text with full reliability
    pub fn with_text(self, content: impl Into<String>) -> Self {
        let snippet = KnowledgeSnippet::new("", content, 1.0, default_category());
        self.with_snippet(snippet)
    }

    /// Parse a corpus from TOML text
    pub fn from_toml(content: &str) -> Result<Self, EvidenceError> {
        let file: CorpusFile = toml::from_str(content)?;
        let corpus = file
            .snippets
            .into_iter()
            .fold(Self::new(file.name), |corpus, entry| {
                let snippet =
                    KnowledgeSnippet::new("", entry.content, entry.reliability, entry.category);
                let snippet = match entry.url {
                    Some(url) => snippet.with_url(url),
                    None => snippet,
                };
                corpus.with_snippet(snippet)
            });
        Ok(corpus)
    }

    /// Load a corpus from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EvidenceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Number of snippets
    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    /// Whether the corpus has no snippets
    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

fn keywords(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_KEYWORD_LEN)
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl EvidenceSource for CorpusSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, query: &str, max_results: usize) -> Vec<KnowledgeSnippet> {
        let query = keywords(query);
        let mut matches: Vec<(usize, usize, &KnowledgeSnippet)> = self
            .snippets
            .iter()
            .enumerate()
            .filter_map(|(position, (snippet, words))| {
                let shared = words.intersection(&query).count();
                (shared > 0).then_some((shared, position, snippet))
            })
            .collect();

        // Most shared keywords first, then most reliable, then insertion order
        matches.sort_by(|a, b| {
            b.0.cmp(&a.0)
                .then(b.2.reliability.total_cmp(&a.2.reliability))
                .then(a.1.cmp(&b.1))
        });

        matches
            .into_iter()
            .take(max_results)
            .map(|(_, _, snippet)| snippet.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn corpus() -> CorpusSource {
        CorpusSource::new("handbook")
            .with_text("Water boils at 100 degrees at sea level")
            .with_snippet(KnowledgeSnippet::new(
                "ignored",
                "Salt water boils at a slightly higher temperature",
                0.8,
                "chemistry",
            ))
            .with_text("The moon orbits the earth")
    }

    #[tokio::test]
    async fn test_fetch_matches_shared_keywords() {
        let hits = corpus().fetch("Does water boil at sea level", 5).await;
        assert_eq!(hits.len(), 2);
        assert!(hits[0].content.starts_with("Water boils"));
        assert!(hits.iter().all(|h| h.source_name == "handbook"));
    }

    #[tokio::test]
    async fn test_fetch_respects_max_results() {
        let hits = corpus().fetch("water", 1).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].reliability, 1.0);
    }

    #[tokio::test]
    async fn test_short_words_do_not_match() {
        assert!(corpus().fetch("at the a", 3).await.is_empty());
    }

    #[test]
    fn test_from_toml() {
        let corpus = CorpusSource::from_toml(
            r#"
            name = "atlas"

            [[snippets]]
            content = "Paris is the capital of France"
            category = "geography"
            url = "https://example.org/paris"

            [[snippets]]
            content = "Mount Everest is the highest mountain"
            reliability = 0.7
            "#,
        )
        .unwrap();

        assert_eq!(corpus.name(), "atlas");
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.snippets[0].0.url.as_deref(), Some("https://example.org/paris"));
        assert_eq!(corpus.snippets[1].0.category, "general");
    }

    #[test]
    fn test_from_file_and_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"disk\"\n[[snippets]]\ncontent = \"stored fact\"").unwrap();
        assert_eq!(CorpusSource::from_file(file.path()).unwrap().len(), 1);

        assert!(matches!(
            CorpusSource::from_toml("not = [valid"),
            Err(EvidenceError::Parse(_))
        ));
    }
}
