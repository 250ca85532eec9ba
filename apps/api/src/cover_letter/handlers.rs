//! Axum route handlers for the Cover Letter API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::cover_letter::generator::{
    generate_cover_letter, Collaborators, GenerateCoverLetterRequest, GenerateCoverLetterResponse,
};
use crate::cover_letter::repository::{self, UpdateCoverLetterRequest};
use crate::errors::AppError;
use crate::models::cover_letter::{CoverLetterExperienceRow, CoverLetterRow};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CoverLetterDetailResponse {
    pub cover_letter: CoverLetterRow,
    pub selected_experiences: Vec<CoverLetterExperienceRow>,
}

/// POST /api/v1/cover-letters/generate
///
/// Full pipeline: rank experiences → optional company research → generate → persist.
pub async fn handle_generate(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<GenerateCoverLetterRequest>,
) -> Result<(StatusCode, Json<GenerateCoverLetterResponse>), AppError> {
    let deps = Collaborators {
        pool: &state.db,
        llm: &state.llm,
        embedder: state.embedder.as_ref(),
        search: state.search.as_deref(),
    };
    let response = generate_cover_letter(deps, user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/cover-letters
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CoverLetterRow>>, AppError> {
    let letters = repository::list_cover_letters(&state.db, user.user_id).await?;
    Ok(Json(letters))
}

/// GET /api/v1/cover-letters/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CoverLetterDetailResponse>, AppError> {
    let cover_letter = repository::get_cover_letter(&state.db, user.user_id, id).await?;
    let selected_experiences = repository::get_linked_experiences(&state.db, id).await?;
    Ok(Json(CoverLetterDetailResponse {
        cover_letter,
        selected_experiences,
    }))
}

/// PUT /api/v1/cover-letters/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateCoverLetterRequest>,
) -> Result<Json<CoverLetterRow>, AppError> {
    update.validate()?;
    let letter = repository::update_cover_letter(&state.db, user.user_id, id, &update).await?;
    Ok(Json(letter))
}

/// DELETE /api/v1/cover-letters/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    repository::delete_cover_letter(&state.db, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
