//! Feature-hashing embedder. No network, no model weights, fully deterministic.

use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use siphasher::sip::SipHasher13;

use crate::embedding::{Embedding, EmbeddingError, EmbeddingProvider};

// Changing either key changes every vector; bump MODEL_TAG alongside.
const HASH_KEY_0: u64 = 0x0123_4567_89ab_cdef;
const HASH_KEY_1: u64 = 0xfedc_ba98_7654_3210;
const MODEL_TAG: &str = "hashing-v1";
pub const DEFAULT_DIMENSION: usize = 512;

pub struct HashingEmbedder {
    dimension: usize,
    model: String,
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        let dimension = dimension.max(1);
        Self {
            dimension,
            model: format!("{MODEL_TAG}-{dimension}"),
        }
    }

    fn hash(token: &str) -> u64 {
        let mut hasher = SipHasher13::new_with_keys(HASH_KEY_0, HASH_KEY_1);
        token.hash(&mut hasher);
        hasher.finish()
    }

    /// Signed bucket counts, L2-normalised.
    pub fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let h = Self::hash(&token);
            let idx = (h % self.dimension as u64) as usize;
            // High bit picks the sign so collisions tend to cancel rather than pile up.
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            vector[idx] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if tokenize(text).next().is_none() {
            return Err(EmbeddingError::EmptyInput);
        }
        Ok(Embedding::new(self.model.clone(), self.vectorize(text)))
    }
}

/// Lower-cased alphanumeric runs.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_are_unit_length() {
        let embedder = HashingEmbedder::default();
        let v = embedder.vectorize("Senior Rust engineer, distributed systems");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5, "norm was {norm}");
        assert_eq!(v.len(), DEFAULT_DIMENSION);
    }

    #[test]
    fn test_deterministic_and_case_insensitive() {
        let embedder = HashingEmbedder::default();
        assert_eq!(
            embedder.vectorize("Backend Engineer"),
            embedder.vectorize("backend   engineer")
        );
    }

    #[test]
    fn test_tokenize_strips_punctuation() {
        let tokens: Vec<_> = tokenize("CSS, HTML/JS; (React)").collect();
        assert_eq!(tokens, vec!["css", "html", "js", "react"]);
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected() {
        let embedder = HashingEmbedder::default();
        assert!(matches!(
            embedder.embed("  ,;  ").await,
            Err(EmbeddingError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn test_model_tag_includes_dimension() {
        let embedder = HashingEmbedder::new(64);
        let e = embedder.embed("rust").await.unwrap();
        assert_eq!(e.model, "hashing-v1-64");
        assert_eq!(e.dimension(), 64);
    }
}
