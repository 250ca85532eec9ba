//! Cover-letter generation: orchestrates the full pipeline.
//!
//! Flow: validate → load experiences → rank against the job description →
//!       optional company research → assemble + generate → persist → return.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::company::{company_context_for_letter, WebSearch};
use crate::cover_letter::assembly::{assemble_cover_letter, GeneratedLetter, JobMetadata};
use crate::embedding::EmbeddingProvider;
use crate::errors::AppError;
use crate::experiences::{repository, resolve_top_k, to_candidate};
use crate::llm_client::TextGenerator;
use crate::models::cover_letter::CoverLetterRow;
use crate::ranking::{rank, ScoredCandidate, SkippedCandidate};

pub const DEFAULT_TONE: &str = "professional";
pub const DEFAULT_MAX_LENGTH: u32 = 500;
const MIN_MAX_LENGTH: u32 = 100;
const MAX_MAX_LENGTH: u32 = 1000;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateCoverLetterRequest {
    pub job_title: String,
    pub company_name: String,
    pub hiring_manager: Option<String>,
    pub job_description: String,
    pub tone: Option<String>,
    pub max_length: Option<u32>,
    /// Restrict ranking to these experiences; `None` ranks all of the user's experiences.
    pub experience_ids: Option<Vec<Uuid>>,
    pub top_k: Option<usize>,
    #[serde(default)]
    pub research_company: bool,
}

/// One experience that fed the letter, in rank order.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedExperience {
    pub experience_id: Uuid,
    pub relevance_order: i32,
    pub score: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateCoverLetterResponse {
    pub cover_letter_id: Uuid,
    #[serde(flatten)]
    pub letter: GeneratedLetter,
    pub selected_experiences: Vec<SelectedExperience>,
    pub skipped_experiences: Vec<SkippedCandidate>,
    pub company_context: Option<String>,
    pub status: String,
}

/// Collaborators the pipeline needs, borrowed from `AppState`.
pub struct Collaborators<'a> {
    pub pool: &'a PgPool,
    pub llm: &'a dyn TextGenerator,
    pub embedder: &'a dyn EmbeddingProvider,
    pub search: Option<&'a dyn WebSearch>,
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the full cover-letter pipeline and persists the result.
pub async fn generate_cover_letter(
    deps: Collaborators<'_>,
    user_id: Uuid,
    request: GenerateCoverLetterRequest,
) -> Result<GenerateCoverLetterResponse, AppError> {
    let job = validate_request(&request)?;
    let k = resolve_top_k(request.top_k)?;

    // Step 1: Load experiences
    let experiences = match &request.experience_ids {
        Some(ids) => repository::get_experiences_by_ids(deps.pool, user_id, ids).await?,
        None => repository::list_experiences(deps.pool, user_id).await?,
    };
    if experiences.is_empty() {
        return Err(AppError::Validation(
            "No experiences found. Add experiences before generating a cover letter.".to_string(),
        ));
    }

    // Step 2: Rank against the job description
    let candidates: Vec<_> = experiences.iter().map(to_candidate).collect();
    let outcome = rank(deps.embedder, &job.job_description, &candidates, k).await?;
    info!(
        "Ranked {} experiences for user {}: selected {}, skipped {}",
        candidates.len(),
        user_id,
        outcome.ranked.len(),
        outcome.skipped.len()
    );
    if outcome.ranked.is_empty() {
        return Err(AppError::Validation(
            "None of the selected experiences could be scored against this job description."
                .to_string(),
        ));
    }

    // Step 3: Optional company research
    let company_context = if request.research_company {
        research_or_skip(&deps, &job).await
    } else {
        None
    };

    // Step 4: Generate
    let letter = assemble_cover_letter(
        deps.llm,
        &outcome.ranked,
        company_context.as_deref().unwrap_or(""),
        &job,
    )
    .await?;

    // Step 5: Persist
    let selected = selected_experiences(&outcome.ranked);
    let row = persist_cover_letter(
        deps.pool,
        user_id,
        &job,
        &letter,
        company_context.as_deref(),
        &selected,
    )
    .await?;

    Ok(GenerateCoverLetterResponse {
        cover_letter_id: row.id,
        letter,
        selected_experiences: selected,
        skipped_experiences: outcome.skipped,
        company_context,
        status: row.status,
    })
}

/// Research is enrichment only: failures are logged and the letter is written without it.
async fn research_or_skip(deps: &Collaborators<'_>, job: &JobMetadata) -> Option<String> {
    let Some(search) = deps.search else {
        warn!("Company research requested but no search API key is configured");
        return None;
    };

    match company_context_for_letter(search, deps.llm, &job.company_name, &job.job_description)
        .await
    {
        Ok(context) => Some(context),
        Err(e) => {
            warn!(
                "Company research for {:?} failed, continuing without it: {e}",
                job.company_name
            );
            None
        }
    }
}

pub fn validate_request(request: &GenerateCoverLetterRequest) -> Result<JobMetadata, AppError> {
    for (name, value) in [
        ("job_title", &request.job_title),
        ("company_name", &request.company_name),
        ("job_description", &request.job_description),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{name} cannot be empty")));
        }
    }

    if matches!(&request.experience_ids, Some(ids) if ids.is_empty()) {
        return Err(AppError::Validation(
            "experience_ids cannot be empty; omit it to use all experiences".to_string(),
        ));
    }

    let max_length = request.max_length.unwrap_or(DEFAULT_MAX_LENGTH);
    if !(MIN_MAX_LENGTH..=MAX_MAX_LENGTH).contains(&max_length) {
        return Err(AppError::Validation(format!(
            "max_length must be between {MIN_MAX_LENGTH} and {MAX_MAX_LENGTH} words"
        )));
    }

    let tone = request
        .tone
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TONE)
        .to_string();

    Ok(JobMetadata {
        job_title: request.job_title.trim().to_string(),
        company_name: request.company_name.trim().to_string(),
        hiring_manager: request.hiring_manager.clone(),
        job_description: request.job_description.clone(),
        tone,
        max_length,
    })
}

fn selected_experiences(ranked: &[ScoredCandidate]) -> Vec<SelectedExperience> {
    ranked
        .iter()
        .enumerate()
        .map(|(i, s)| SelectedExperience {
            experience_id: s.candidate.id,
            relevance_order: i as i32 + 1,
            score: s.score,
        })
        .collect()
}

/// Letter and links are written in one transaction.
async fn persist_cover_letter(
    pool: &PgPool,
    user_id: Uuid,
    job: &JobMetadata,
    letter: &GeneratedLetter,
    company_context: Option<&str>,
    selected: &[SelectedExperience],
) -> Result<CoverLetterRow, AppError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, CoverLetterRow>(
        r#"
        INSERT INTO cover_letters
            (id, user_id, job_title, company_name, hiring_manager, job_description, tone,
             max_length, generated_content, chances, chances_explanation, company_context, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'draft')
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&job.job_title)
    .bind(&job.company_name)
    .bind(&job.hiring_manager)
    .bind(&job.job_description)
    .bind(&job.tone)
    .bind(job.max_length as i32)
    .bind(&letter.cover_letter)
    .bind(&letter.chances)
    .bind(&letter.chances_explanation)
    .bind(company_context)
    .fetch_one(&mut *tx)
    .await?;

    for link in selected {
        sqlx::query(
            r#"
            INSERT INTO cover_letter_experiences
                (id, cover_letter_id, experience_id, relevance_order, score)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(row.id)
        .bind(link.experience_id)
        .bind(link.relevance_order)
        .bind(link.score)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    info!(
        "Saved cover letter {} with {} linked experiences for user {}",
        row.id,
        selected.len(),
        user_id
    );
    Ok(row)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::Candidate;

    fn request() -> GenerateCoverLetterRequest {
        serde_json::from_value(serde_json::json!({
            "job_title": "  Backend Engineer ",
            "company_name": "Acme",
            "job_description": "Distributed systems in Rust."
        }))
        .unwrap()
    }

    #[test]
    fn test_request_defaults() {
        let req = request();
        assert!(!req.research_company);
        assert!(req.experience_ids.is_none());

        let job = validate_request(&req).unwrap();
        assert_eq!(job.job_title, "Backend Engineer");
        assert_eq!(job.tone, DEFAULT_TONE);
        assert_eq!(job.max_length, DEFAULT_MAX_LENGTH);
    }

    #[test]
    fn test_blank_company_rejected() {
        let mut req = request();
        req.company_name = " ".to_string();
        assert!(matches!(validate_request(&req), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_empty_experience_ids_rejected() {
        let mut req = request();
        req.experience_ids = Some(vec![]);
        assert!(validate_request(&req).is_err());
    }

    #[test]
    fn test_max_length_bounds() {
        let mut req = request();
        req.max_length = Some(50);
        assert!(validate_request(&req).is_err());
        req.max_length = Some(800);
        assert_eq!(validate_request(&req).unwrap().max_length, 800);
    }

    #[test]
    fn test_selected_experiences_are_one_based() {
        let ranked: Vec<_> = [0.9f32, 0.5]
            .iter()
            .map(|&score| ScoredCandidate {
                candidate: Candidate {
                    id: Uuid::new_v4(),
                    text: "t".to_string(),
                },
                score,
            })
            .collect();
        let selected = selected_experiences(&ranked);
        assert_eq!(selected[0].relevance_order, 1);
        assert_eq!(selected[1].relevance_order, 2);
        assert_eq!(selected[1].experience_id, ranked[1].candidate.id);
    }

    #[test]
    fn test_response_flattens_letter_fields() {
        let response = GenerateCoverLetterResponse {
            cover_letter_id: Uuid::nil(),
            letter: GeneratedLetter {
                cover_letter: "Dear team".to_string(),
                chances: "Good".to_string(),
                chances_explanation: "Solid match".to_string(),
            },
            selected_experiences: vec![],
            skipped_experiences: vec![],
            company_context: None,
            status: "draft".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["cover_letter"], "Dear team");
        assert_eq!(json["chances"], "Good");
        assert_eq!(json["chances_explanation"], "Solid match");
    }
}
