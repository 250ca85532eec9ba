use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::cover_letter::assembly::GenerationFormatError;
use crate::embedding::EmbeddingError;
use crate::ranking::RankError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Generation format error: {0}")]
    GenerationFormat(#[from] GenerationFormatError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<RankError> for AppError {
    fn from(err: RankError) -> Self {
        match err {
            RankError::InvalidK => AppError::Validation(err.to_string()),
            RankError::QueryEmbedding(e) => AppError::Embedding(e),
        }
    }
}

impl AppError {
    /// Stable machine-readable code returned in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Embedding(_) => "EMBEDDING_ERROR",
            AppError::GenerationFormat(_) => "GENERATION_FORMAT_ERROR",
            AppError::Llm(_) => "LLM_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => {
                tracing::debug!("Rejected request: {msg}");
                (
                    StatusCode::UNAUTHORIZED,
                    "Authentication required".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            AppError::Embedding(e) => {
                tracing::error!("Embedding error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "The job description could not be embedded".to_string(),
                )
            }
            AppError::GenerationFormat(e) => {
                tracing::error!("Generation format error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "The cover letter generator returned an unexpected format".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("Experience x not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_generation_format_maps_to_bad_gateway() {
        let err = AppError::from(GenerationFormatError::NotJson("hello".into()));
        assert_eq!(err.code(), "GENERATION_FORMAT_ERROR");
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_rank_errors_map_by_kind() {
        assert_eq!(AppError::from(RankError::InvalidK).code(), "VALIDATION_ERROR");
        let err = AppError::from(RankError::QueryEmbedding(EmbeddingError::EmptyInput));
        assert_eq!(err.code(), "EMBEDDING_ERROR");
    }
}
