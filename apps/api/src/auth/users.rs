use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::Identity;
use crate::errors::AppError;
use crate::models::user::User;

/// Returns the local user for a verified identity, creating it on first sight.
/// A changed email on the provider side is copied over.
pub async fn get_or_create_user(pool: &PgPool, identity: &Identity) -> Result<User, AppError> {
    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE external_id = $1")
        .bind(&identity.external_id)
        .fetch_optional(pool)
        .await?;

    if let Some(user) = existing {
        if identity.email.is_none() || identity.email == user.email {
            return Ok(user);
        }
    }

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, external_id, email)
        VALUES ($1, $2, $3)
        ON CONFLICT (external_id) DO UPDATE SET email = EXCLUDED.email
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&identity.external_id)
    .bind(&identity.email)
    .fetch_one(pool)
    .await?;

    info!("Upserted user {} for subject {}", user.id, identity.external_id);
    Ok(user)
}
