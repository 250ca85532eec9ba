//! OpenAI-compatible `/embeddings` client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::embedding::{Embedding, EmbeddingError, EmbeddingProvider};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(client: Client, base_url: &str, api_key: String, model: String) -> Self {
        Self {
            client,
            endpoint: embeddings_endpoint(base_url),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .filter(|v| !v.is_empty())
            .ok_or(EmbeddingError::MissingVector)?;

        debug!("Embedded {} chars into {} dims", text.len(), vector.len());

        Ok(Embedding::new(self.model.clone(), vector))
    }
}

fn embeddings_endpoint(base_url: &str) -> String {
    format!("{}/embeddings", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        assert_eq!(
            embeddings_endpoint("https://api.openai.com/v1/"),
            "https://api.openai.com/v1/embeddings"
        );
        assert_eq!(
            embeddings_endpoint("http://localhost:11434/v1"),
            "http://localhost:11434/v1/embeddings"
        );
    }

    #[test]
    fn test_response_shape_deserializes() {
        let json = r#"{"object":"list","data":[{"object":"embedding","index":0,"embedding":[0.1,-0.2]}],"model":"text-embedding-ada-002"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.data[0].embedding, vec![0.1, -0.2]);
    }

    #[tokio::test]
    async fn test_blank_input_short_circuits() {
        let embedder = HttpEmbedder::new(
            Client::new(),
            "http://127.0.0.1:9",
            "key".into(),
            "m".into(),
        );
        assert!(matches!(embedder.embed("   ").await, Err(EmbeddingError::EmptyInput)));
    }
}
