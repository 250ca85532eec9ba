use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CoverLetterRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub job_title: String,
    pub company_name: String,
    pub hiring_manager: Option<String>,
    pub job_description: String,
    pub tone: String,
    pub max_length: i32,
    pub generated_content: String,
    pub chances: String,
    pub chances_explanation: String,
    pub company_context: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Link between a letter and one of the experiences that fed its prompt.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CoverLetterExperienceRow {
    pub id: Uuid,
    pub cover_letter_id: Uuid,
    pub experience_id: Uuid,
    /// 1-based position in the ranking.
    pub relevance_order: i32,
    pub score: f32,
    pub created_at: DateTime<Utc>,
}
