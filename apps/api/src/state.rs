use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenVerifier;
use crate::company::WebSearch;
use crate::embedding::EmbeddingProvider;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// HttpEmbedder when EMBEDDING_API_KEY is set, HashingEmbedder otherwise.
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// None without SERPAPI_API_KEY; company research is then unavailable.
    pub search: Option<Arc<dyn WebSearch>>,
    pub verifier: Arc<dyn TokenVerifier>,
}
