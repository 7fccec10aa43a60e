use sqlx::PgPool;

use crate::db::hydrate::collapse_one;
use crate::error::ApiError;
use crate::models::parent::{
    ChildSummary, Parent, ParentChildRow, ParentPayload, ParentWithChildren,
};

pub struct ParentService;

impl ParentService {
    pub async fn list(pool: &PgPool) -> Result<Vec<Parent>, ApiError> {
        let parents = sqlx::query_as::<_, Parent>(
            "SELECT id, name, email, phone FROM parents ORDER BY id",
        )
        .fetch_all(pool)
        .await?;
        Ok(parents)
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Parent, ApiError> {
        sqlx::query_as::<_, Parent>("SELECT id, name, email, phone FROM parents WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?
            .ok_or(ApiError::NotFound("Parent"))
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parents WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    /// Parent hydrated with its children, collapsed out of one outer join.
    pub async fn get_with_children(
        pool: &PgPool,
        id: i64,
    ) -> Result<ParentWithChildren, ApiError> {
        let rows = sqlx::query_as::<_, ParentChildRow>(
            "SELECT p.id, p.name, p.email, p.phone,
                    c.id AS c_id, c.name AS child_name
             FROM parents p
             LEFT JOIN parent_children pc ON pc.parent_id = p.id
             LEFT JOIN children c ON c.id = pc.child_id
             WHERE p.id = $1
             ORDER BY c.id",
        )
        .bind(id)
        .fetch_all(pool)
        .await?;

        hydrate_one(&rows).ok_or(ApiError::NotFound("Parent"))
    }

    pub async fn create(pool: &PgPool, payload: &ParentPayload) -> Result<Parent, ApiError> {
        validate_parent(payload)?;

        let parent = sqlx::query_as::<_, Parent>(
            "INSERT INTO parents (name, email, phone) VALUES ($1, $2, $3)
             RETURNING id, name, email, phone",
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .fetch_one(pool)
        .await?;
        Ok(parent)
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        payload: &ParentPayload,
    ) -> Result<Parent, ApiError> {
        validate_parent(payload)?;

        sqlx::query_as::<_, Parent>(
            "UPDATE parents SET name = $1, email = $2, phone = $3 WHERE id = $4
             RETURNING id, name, email, phone",
        )
        .bind(&payload.name)
        .bind(&payload.email)
        .bind(&payload.phone)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Parent"))
    }

    /// Delete a parent together with its parent_children rows. Vehicles
    /// owned by the parent still block the delete at the foreign key.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        Self::get(pool, id).await?;

        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM parent_children WHERE parent_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM parents WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

fn hydrate_one(rows: &[ParentChildRow]) -> Option<ParentWithChildren> {
    collapse_one(
        rows,
        |row| row.id,
        |row| ParentWithChildren {
            id: row.id,
            name: row.name.clone(),
            email: row.email.clone(),
            phone: row.phone.clone(),
            children: Vec::new(),
        },
        |row| row.c_id,
        |parent, row| {
            parent.children.push(ChildSummary {
                id: row.c_id.unwrap_or_default(),
                name: row.child_name.clone().unwrap_or_default(),
            });
        },
    )
}

fn validate_parent(payload: &ParentPayload) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Parent name is required"));
    }
    if payload.email.trim().is_empty() {
        return Err(ApiError::validation("Parent email is required"));
    }
    if !payload.email.contains('@') {
        return Err(ApiError::validation("Invalid email format, must contain @"));
    }
    if payload.phone.trim().is_empty() {
        return Err(ApiError::validation("Parent phone is required"));
    }
    if !valid_phone(&payload.phone) {
        return Err(ApiError::validation(
            "Invalid phone format, must start with 06 or 07 and contain 10 digits",
        ));
    }
    Ok(())
}

/// 10 digits, starting with the 06 or 07 mobile prefix.
fn valid_phone(phone: &str) -> bool {
    phone.len() == 10
        && phone.chars().all(|c| c.is_ascii_digit())
        && (phone.starts_with("06") || phone.starts_with("07"))
}
