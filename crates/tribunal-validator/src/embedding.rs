//! Text embeddings for claim comparison
//!
//! Provides a hashed bag-of-words embedding. Each lowercase word is hashed
//! with SHA-256 into one signed bucket, then the vector is normalized to
//! unit length. Output is identical on every platform and every run.
//!
//! # Examples
//!
//! ```rust
//! use tribunal_validator::embedding::{cosine_similarity, EmbeddingModel, HashedEmbeddingModel};
//!
//! let model = HashedEmbeddingModel::new(64);
//! let a = model.embed("The sky is blue").unwrap();
//! let b = model.embed("the sky is BLUE!").unwrap();
//! assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
//! ```

use crate::ValidatorError;
use sha2::{Digest, Sha256};

/// Trait for embedding models
pub trait EmbeddingModel: Send + Sync {
    /// Generate an embedding vector for the given text
    fn embed(&self, text: &str) -> Result<Vec<f32>, ValidatorError>;

    /// Get the dimension of embeddings produced by this model
    fn dimension(&self) -> usize;
}

/// Deterministic hashed bag-of-words embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashedEmbeddingModel {
    dimension: usize,
}

impl HashedEmbeddingModel {
    /// Create a new model producing `dimension`-length vectors
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Bucket index and sign for one token
    fn bucket(&self, token: &str) -> (usize, f32) {
        let digest = Sha256::digest(token.as_bytes());
        let mut seed = [0u8; 8];
        seed.copy_from_slice(&digest[..8]);
        let index = (u64::from_be_bytes(seed) % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }
}

impl EmbeddingModel for HashedEmbeddingModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>, ValidatorError> {
        if self.dimension == 0 {
            return Err(ValidatorError::Config(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }

        // Text without any word embeds as the zero vector
        let mut embedding = vec![0.0f32; self.dimension];
        for word in text.split_whitespace() {
            let token = word
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            let (index, sign) = self.bucket(&token);
            embedding[index] += sign;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity in [-1, 1]
///
/// Zero vectors and vectors of different lengths have similarity 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}
