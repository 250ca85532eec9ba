use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    /// Subject claim issued by the identity provider.
    pub external_id: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}
