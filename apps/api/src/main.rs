mod auth;
mod company;
mod config;
mod cover_letter;
mod db;
mod embedding;
mod errors;
mod experiences;
mod llm_client;
mod models;
mod ranking;
mod routes;
mod state;

use anyhow::Result;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::{JwtVerifier, TokenVerifier};
use crate::company::{SerpApiClient, WebSearch};
use crate::config::Config;
use crate::db::create_pool;
use crate::embedding::{EmbeddingProvider, HashingEmbedder, HttpEmbedder};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("coverly_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coverly API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;

    // One HTTP client for every outbound collaborator
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()?;

    let llm = LlmClient::new(http.clone(), config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let embedder: Arc<dyn EmbeddingProvider> = match &config.embedding_api_key {
        Some(key) => Arc::new(HttpEmbedder::new(
            http.clone(),
            &config.embedding_api_url,
            key.clone(),
            config.embedding_model.clone(),
        )),
        None => {
            warn!("EMBEDDING_API_KEY not set, falling back to local hashing embedder");
            Arc::new(HashingEmbedder::default())
        }
    };
    info!("Embedder initialized (model: {})", embedder.model());

    let search: Option<Arc<dyn WebSearch>> = match &config.serpapi_api_key {
        Some(key) => Some(Arc::new(SerpApiClient::new(http.clone(), key.clone()))),
        None => {
            warn!("SERPAPI_API_KEY not set, company research disabled");
            None
        }
    };

    let verifier: Arc<dyn TokenVerifier> = Arc::new(JwtVerifier::new(&config.jwt_secret));

    let cors = build_cors(&config.cors_origins);

    let state = AppState {
        db,
        llm,
        embedder,
        search,
        verifier,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Permissive when no origins are configured (local development).
fn build_cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {o:?}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
