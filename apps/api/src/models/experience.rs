use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company_name: String,
    pub title: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: String,
    /// Text fed to the embedder; rebuilt whenever a field it covers changes.
    pub content_for_embedding: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
