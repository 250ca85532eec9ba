//! Axum route handlers for the Experiences API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::experiences::repository;
use crate::experiences::{
    resolve_top_k, to_candidate, CreateExperienceRequest, ExperienceFields,
    UpdateExperienceRequest,
};
use crate::models::experience::ExperienceRow;
use crate::ranking::{rank, SkippedCandidate};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RankExperiencesRequest {
    pub job_description: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RankedExperience {
    pub experience: ExperienceRow,
    pub score: f32,
}

#[derive(Debug, Serialize)]
pub struct RankExperiencesResponse {
    pub ranked: Vec<RankedExperience>,
    pub skipped: Vec<SkippedCandidate>,
}

/// POST /api/v1/experiences
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateExperienceRequest>,
) -> Result<(StatusCode, Json<ExperienceRow>), AppError> {
    let fields = ExperienceFields::from(req);
    fields.validate()?;
    let row = repository::insert_experience(&state.db, user.user_id, &fields).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/experiences
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ExperienceRow>>, AppError> {
    let experiences = repository::list_experiences(&state.db, user.user_id).await?;
    Ok(Json(experiences))
}

/// GET /api/v1/experiences/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ExperienceRow>, AppError> {
    let experience = repository::get_experience(&state.db, user.user_id, id).await?;
    Ok(Json(experience))
}

/// PUT /api/v1/experiences/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<UpdateExperienceRequest>,
) -> Result<Json<ExperienceRow>, AppError> {
    let existing = repository::get_experience(&state.db, user.user_id, id).await?;
    let fields = ExperienceFields::from_row(&existing).apply(patch);
    fields.validate()?;
    let row = repository::update_experience(&state.db, user.user_id, id, &fields).await?;
    Ok(Json(row))
}

/// DELETE /api/v1/experiences/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    repository::delete_experience(&state.db, user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/experiences/rank
///
/// Previews which experiences a cover letter for this job would draw on.
pub async fn handle_rank(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<RankExperiencesRequest>,
) -> Result<Json<RankExperiencesResponse>, AppError> {
    if req.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    let k = resolve_top_k(req.top_k)?;

    let rows = repository::list_experiences(&state.db, user.user_id).await?;
    let candidates: Vec<_> = rows.iter().map(to_candidate).collect();
    let outcome = rank(
        state.embedder.as_ref(),
        &req.job_description,
        &candidates,
        k,
    )
    .await?;

    let ranked = outcome
        .ranked
        .into_iter()
        .filter_map(|scored| {
            rows.iter()
                .find(|r| r.id == scored.candidate.id)
                .map(|r| RankedExperience {
                    experience: r.clone(),
                    score: scored.score,
                })
        })
        .collect();

    Ok(Json(RankExperiencesResponse {
        ranked,
        skipped: outcome.skipped,
    }))
}
