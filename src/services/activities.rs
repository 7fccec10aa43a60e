use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::activity::{Activity, ActivityPayload};

pub struct ActivityService;

impl ActivityService {
    pub async fn list(pool: &PgPool) -> Result<Vec<Activity>, ApiError> {
        let activities = sqlx::query_as::<_, Activity>(
            "SELECT id, name, address FROM activities ORDER BY id",
        )
        .fetch_all(pool)
        .await?;
        Ok(activities)
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Activity, ApiError> {
        sqlx::query_as::<_, Activity>("SELECT id, name, address FROM activities WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound("Activity"))
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM activities WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    pub async fn create(pool: &PgPool, payload: &ActivityPayload) -> Result<Activity, ApiError> {
        validate_activity(payload)?;

        let activity = sqlx::query_as::<_, Activity>(
            "INSERT INTO activities (name, address) VALUES ($1, $2) RETURNING id, name, address",
        )
        .bind(&payload.name)
        .bind(&payload.address)
        .fetch_one(pool)
        .await?;
        Ok(activity)
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        payload: &ActivityPayload,
    ) -> Result<Activity, ApiError> {
        validate_activity(payload)?;

        sqlx::query_as::<_, Activity>(
            "UPDATE activities SET name = $1, address = $2 WHERE id = $3
             RETURNING id, name, address",
        )
        .bind(&payload.name)
        .bind(&payload.address)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Activity"))
    }

    /// Delete an activity together with its child_activities rows, so no
    /// association outlives the activity. Transports referencing the
    /// activity still block the delete at the foreign key.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        Self::get(pool, id).await?;

        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM child_activities WHERE activity_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM activities WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn validate_activity(payload: &ActivityPayload) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Activity name is required"));
    }
    if payload.address.trim().is_empty() {
        return Err(ApiError::validation("Activity address is required"));
    }
    Ok(())
}
