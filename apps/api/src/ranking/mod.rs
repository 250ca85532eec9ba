//! Relevance Ranker: scores candidate texts against a query by embedding cosine similarity
//! and keeps the top K.
//!
//! Pure with respect to its inputs: no state survives between calls, candidates are only
//! borrowed, and the embedder is passed in by the caller.

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::embedding::{Embedding, EmbeddingError, EmbeddingProvider};

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// A record considered for ranking. `text` is what gets embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate: Candidate,
    /// Cosine similarity in [-1, 1]; 0 when either vector has zero norm.
    pub score: f32,
}

/// A candidate dropped because its embedding failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedCandidate {
    pub id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankOutcome {
    /// Descending by score, ties in input order, at most `k` long.
    pub ranked: Vec<ScoredCandidate>,
    pub skipped: Vec<SkippedCandidate>,
}

#[derive(Debug, Error)]
pub enum RankError {
    #[error("k must be a positive integer")]
    InvalidK,

    #[error("failed to embed query: {0}")]
    QueryEmbedding(EmbeddingError),
}

// ────────────────────────────────────────────────────────────────────────────
// Ranking
// ────────────────────────────────────────────────────────────────────────────

/// Ranks `candidates` against `query` and returns the top `k`.
///
/// 1. Empty candidates → empty outcome, embedder never called
/// 2. Embed the query once (failure is fatal)
/// 3. Embed every candidate concurrently; failures are skipped and logged
/// 4. Stable sort descending by cosine similarity, then truncate to `k`
pub async fn rank(
    embedder: &dyn EmbeddingProvider,
    query: &str,
    candidates: &[Candidate],
    k: usize,
) -> Result<RankOutcome, RankError> {
    if k == 0 {
        return Err(RankError::InvalidK);
    }
    if candidates.is_empty() {
        return Ok(RankOutcome::default());
    }

    let query_embedding = embedder
        .embed(query)
        .await
        .and_then(|e| e.check_finite().map(|()| e))
        .map_err(RankError::QueryEmbedding)?;

    // join_all yields results in input order, which the stable sort relies on.
    let embeddings = join_all(candidates.iter().map(|c| embedder.embed(&c.text))).await;

    let mut ranked = Vec::with_capacity(candidates.len());
    let mut skipped = Vec::new();

    for (candidate, result) in candidates.iter().zip(embeddings) {
        match result.and_then(|e| score_against(&query_embedding, &e)) {
            Ok(score) => ranked.push(ScoredCandidate {
                candidate: candidate.clone(),
                score,
            }),
            Err(e) => {
                warn!("Skipping candidate {} from ranking: {e}", candidate.id);
                skipped.push(SkippedCandidate {
                    id: candidate.id,
                    reason: e.to_string(),
                });
            }
        }
    }

    // sort_by is stable, so equal scores keep input order.
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(k);

    debug!(
        "Ranked {} candidates: kept {}, skipped {}",
        candidates.len(),
        ranked.len(),
        skipped.len()
    );

    Ok(RankOutcome { ranked, skipped })
}

fn score_against(query: &Embedding, candidate: &Embedding) -> Result<f32, EmbeddingError> {
    candidate.check_finite()?;
    query.check_compatible(candidate)?;
    Ok(cosine_similarity(&query.vector, &candidate.vector))
}

/// dot(a, b) / (‖a‖·‖b‖), clamped to [-1, 1]. Accumulates in f64.
///
/// Returns 0.0 when either vector has zero norm, the lengths differ, or the result is not
/// finite (NaN components).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !score.is_finite() {
        return 0.0;
    }
    score.clamp(-1.0, 1.0) as f32
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
