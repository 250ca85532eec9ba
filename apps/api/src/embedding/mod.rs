//! Embedding providers: turn text into vectors for relevance ranking.
//!
//! `AppState` holds an `Arc<dyn EmbeddingProvider>`, chosen at startup:
//! `HttpEmbedder` when an embedding API key is configured, `HashingEmbedder` otherwise.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod hashing;
pub mod http;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("cannot embed empty text")]
    EmptyInput,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding API returned no vector")]
    MissingVector,

    #[error("embedding mismatch: query is {expected}, candidate is {actual}")]
    Incompatible { expected: String, actual: String },

    #[error("embedding from {model} has a non-finite component")]
    NonFinite { model: String },
}

/// A vector tagged with the model that produced it.
/// Two embeddings are only comparable when `model` and dimension agree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub model: String,
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(model: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            model: model.into(),
            vector,
        }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Errors with `NonFinite` if any component is NaN or infinite.
    pub fn check_finite(&self) -> Result<(), EmbeddingError> {
        if self.vector.iter().all(|x| x.is_finite()) {
            Ok(())
        } else {
            Err(EmbeddingError::NonFinite {
                model: self.model.clone(),
            })
        }
    }

    /// Errors with `Incompatible` unless `other` came from the same model with the same length.
    pub fn check_compatible(&self, other: &Embedding) -> Result<(), EmbeddingError> {
        if self.model != other.model || self.dimension() != other.dimension() {
            return Err(EmbeddingError::Incompatible {
                expected: format!("{}[{}]", self.model, self.dimension()),
                actual: format!("{}[{}]", other.model, other.dimension()),
            });
        }
        Ok(())
    }
}

/// Text → vector contract. Deterministic for a fixed model version.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model tag stamped on every embedding this provider returns.
    fn model(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incompatible_models_rejected() {
        let a = Embedding::new("hash-v1", vec![1.0, 0.0]);
        let b = Embedding::new("ada-002", vec![1.0, 0.0]);
        assert!(matches!(
            a.check_compatible(&b),
            Err(EmbeddingError::Incompatible { .. })
        ));
    }

    #[test]
    fn test_non_finite_components_rejected() {
        assert!(Embedding::new("m", vec![1e20, -3.0]).check_finite().is_ok());
        for bad in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(
                Embedding::new("m", vec![1.0, bad]).check_finite(),
                Err(EmbeddingError::NonFinite { .. })
            ));
        }
    }

    #[test]
    fn test_incompatible_dimensions_rejected() {
        let a = Embedding::new("m", vec![1.0, 0.0]);
        let b = Embedding::new("m", vec![1.0, 0.0, 0.0]);
        assert!(a.check_compatible(&b).is_err());
        assert!(a.check_compatible(&a.clone()).is_ok());
    }
}
