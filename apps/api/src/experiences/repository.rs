use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::experiences::ExperienceFields;
use crate::models::experience::ExperienceRow;

pub async fn insert_experience(
    pool: &PgPool,
    user_id: Uuid,
    fields: &ExperienceFields,
) -> Result<ExperienceRow, AppError> {
    let row = sqlx::query_as::<_, ExperienceRow>(
        r#"
        INSERT INTO experiences
            (id, user_id, company_name, title, location, start_date, end_date,
             is_current, description, content_for_embedding)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&fields.company_name)
    .bind(&fields.title)
    .bind(&fields.location)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.is_current)
    .bind(&fields.description)
    .bind(fields.content_for_embedding())
    .fetch_one(pool)
    .await?;

    info!("Created experience {} for user {}", row.id, user_id);
    Ok(row)
}

/// Newest first.
pub async fn list_experiences(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ExperienceRow>, AppError> {
    Ok(sqlx::query_as::<_, ExperienceRow>(
        "SELECT * FROM experiences WHERE user_id = $1 ORDER BY start_date DESC, created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Rows owned by `user_id` among `ids`, in the order `ids` lists them.
/// Any id that is absent or owned by someone else is a `NotFound`.
pub async fn get_experiences_by_ids(
    pool: &PgPool,
    user_id: Uuid,
    ids: &[Uuid],
) -> Result<Vec<ExperienceRow>, AppError> {
    let rows = sqlx::query_as::<_, ExperienceRow>(
        "SELECT * FROM experiences WHERE user_id = $1 AND id = ANY($2)",
    )
    .bind(user_id)
    .bind(ids)
    .fetch_all(pool)
    .await?;

    order_by_requested(rows, ids)
}

fn order_by_requested(
    rows: Vec<ExperienceRow>,
    ids: &[Uuid],
) -> Result<Vec<ExperienceRow>, AppError> {
    let mut ordered = Vec::with_capacity(ids.len());
    for id in ids {
        if ordered.iter().any(|r: &ExperienceRow| r.id == *id) {
            continue;
        }
        let row = rows
            .iter()
            .find(|r| r.id == *id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Experience {id} not found")))?;
        ordered.push(row);
    }
    Ok(ordered)
}

pub async fn get_experience(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<ExperienceRow, AppError> {
    sqlx::query_as::<_, ExperienceRow>("SELECT * FROM experiences WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Experience {id} not found")))
}

pub async fn update_experience(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    fields: &ExperienceFields,
) -> Result<ExperienceRow, AppError> {
    sqlx::query_as::<_, ExperienceRow>(
        r#"
        UPDATE experiences
        SET company_name = $1, title = $2, location = $3, start_date = $4, end_date = $5,
            is_current = $6, description = $7, content_for_embedding = $8, updated_at = NOW()
        WHERE id = $9 AND user_id = $10
        RETURNING *
        "#,
    )
    .bind(&fields.company_name)
    .bind(&fields.title)
    .bind(&fields.location)
    .bind(fields.start_date)
    .bind(fields.end_date)
    .bind(fields.is_current)
    .bind(&fields.description)
    .bind(fields.content_for_embedding())
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Experience {id} not found")))
}

pub async fn delete_experience(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM experiences WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Experience {id} not found")));
    }

    info!("Deleted experience {id} for user {user_id}");
    Ok(())
}
