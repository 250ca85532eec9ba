use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::cover_letter::{CoverLetterExperienceRow, CoverLetterRow};

pub const STATUSES: [&str; 3] = ["draft", "final", "sent"];

/// User edits to a stored letter. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCoverLetterRequest {
    pub generated_content: Option<String>,
    pub status: Option<String>,
}

impl UpdateCoverLetterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.generated_content.is_none() && self.status.is_none() {
            return Err(AppError::Validation("nothing to update".to_string()));
        }
        if let Some(content) = &self.generated_content {
            if content.trim().is_empty() {
                return Err(AppError::Validation(
                    "generated_content cannot be empty".to_string(),
                ));
            }
        }
        if let Some(status) = &self.status {
            if !STATUSES.contains(&status.as_str()) {
                return Err(AppError::Validation(format!(
                    "status must be one of {}",
                    STATUSES.join(", ")
                )));
            }
        }
        Ok(())
    }
}

/// Newest first.
pub async fn list_cover_letters(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<CoverLetterRow>, AppError> {
    Ok(sqlx::query_as::<_, CoverLetterRow>(
        "SELECT * FROM cover_letters WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn get_cover_letter(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<CoverLetterRow, AppError> {
    sqlx::query_as::<_, CoverLetterRow>(
        "SELECT * FROM cover_letters WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Cover letter {id} not found")))
}

/// Experience links in relevance order.
pub async fn get_linked_experiences(
    pool: &PgPool,
    cover_letter_id: Uuid,
) -> Result<Vec<CoverLetterExperienceRow>, AppError> {
    Ok(sqlx::query_as::<_, CoverLetterExperienceRow>(
        "SELECT * FROM cover_letter_experiences WHERE cover_letter_id = $1 ORDER BY relevance_order",
    )
    .bind(cover_letter_id)
    .fetch_all(pool)
    .await?)
}

pub async fn update_cover_letter(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    update: &UpdateCoverLetterRequest,
) -> Result<CoverLetterRow, AppError> {
    sqlx::query_as::<_, CoverLetterRow>(
        r#"
        UPDATE cover_letters
        SET generated_content = COALESCE($1, generated_content),
            status = COALESCE($2, status),
            updated_at = NOW()
        WHERE id = $3 AND user_id = $4
        RETURNING *
        "#,
    )
    .bind(&update.generated_content)
    .bind(&update.status)
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Cover letter {id} not found")))
}

/// Links go with the letter via ON DELETE CASCADE.
pub async fn delete_cover_letter(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM cover_letters WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Cover letter {id} not found")));
    }

    info!("Deleted cover letter {id} for user {user_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_update_rejected() {
        assert!(UpdateCoverLetterRequest::default().validate().is_err());
    }

    #[test]
    fn test_unknown_status_rejected() {
        let update = UpdateCoverLetterRequest {
            status: Some("archived".to_string()),
            ..Default::default()
        };
        assert!(matches!(update.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_content_edit_accepted() {
        let update = UpdateCoverLetterRequest {
            generated_content: Some("Dear Ada,".to_string()),
            status: Some("final".to_string()),
        };
        assert!(update.validate().is_ok());
    }
}
