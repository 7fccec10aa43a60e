use sqlx::PgPool;

use crate::db::hydrate::collapse_rows;
use crate::error::ApiError;
use crate::models::child::{Child, ChildJoinRow, ChildPayload};
use crate::services::activities::ActivityService;
use crate::services::parents::ParentService;

/// Child columns plus the (nullable) parent and activity columns, one row
/// per (parent, activity) combination the outer joins produce.
const CHILD_JOIN: &str = "SELECT c.id, c.name,
       p.id AS p_id, p.name AS parent_name, p.email AS parent_email, p.phone AS parent_phone,
       a.id AS a_id, a.name AS activity_name, a.address AS activity_address
 FROM children c
 LEFT JOIN parent_children pc ON pc.child_id = c.id
 LEFT JOIN parents p ON p.id = pc.parent_id
 LEFT JOIN child_activities ca ON ca.child_id = c.id
 LEFT JOIN activities a ON a.id = ca.activity_id";

pub struct ChildService;

impl ChildService {
    pub async fn list(pool: &PgPool) -> Result<Vec<Child>, ApiError> {
        let rows = sqlx::query_as::<_, ChildJoinRow>(&format!("{CHILD_JOIN} ORDER BY c.id, a.id"))
            .fetch_all(pool)
            .await?;
        Ok(hydrate(&rows))
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Child, ApiError> {
        let rows = sqlx::query_as::<_, ChildJoinRow>(&format!(
            "{CHILD_JOIN} WHERE c.id = $1 ORDER BY a.id"
        ))
        .bind(id)
        .fetch_all(pool)
        .await?;

        hydrate_one(&rows).ok_or(ApiError::NotFound("Child"))
    }

    pub async fn list_by_parent(pool: &PgPool, parent_id: i64) -> Result<Vec<Child>, ApiError> {
        let rows = sqlx::query_as::<_, ChildJoinRow>(
            "SELECT c.id, c.name,
                    p.id AS p_id, p.name AS parent_name, p.email AS parent_email, p.phone AS parent_phone,
                    a.id AS a_id, a.name AS activity_name, a.address AS activity_address
             FROM children c
             JOIN parent_children pc ON pc.child_id = c.id
             JOIN parents p ON p.id = pc.parent_id
             LEFT JOIN child_activities ca ON ca.child_id = c.id
             LEFT JOIN activities a ON a.id = ca.activity_id
             WHERE p.id = $1
             ORDER BY c.id, a.id",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await?;
        Ok(hydrate(&rows))
    }

    pub async fn list_by_activity(
        pool: &PgPool,
        activity_id: i64,
    ) -> Result<Vec<Child>, ApiError> {
        let rows = sqlx::query_as::<_, ChildJoinRow>(
            "SELECT c.id, c.name,
                    p.id AS p_id, p.name AS parent_name, p.email AS parent_email, p.phone AS parent_phone,
                    a.id AS a_id, a.name AS activity_name, a.address AS activity_address
             FROM children c
             JOIN child_activities ca ON ca.child_id = c.id
             JOIN activities a ON a.id = ca.activity_id
             LEFT JOIN parent_children pc ON pc.child_id = c.id
             LEFT JOIN parents p ON p.id = pc.parent_id
             WHERE a.id = $1
             ORDER BY c.id",
        )
        .bind(activity_id)
        .fetch_all(pool)
        .await?;
        Ok(hydrate(&rows))
    }

    /// Insert the child row and its association rows in one transaction; a
    /// failed association insert leaves no partial child behind.
    pub async fn create(pool: &PgPool, payload: &ChildPayload) -> Result<Child, ApiError> {
        validate_child(payload)?;

        let mut tx = pool.begin().await?;

        let child_id: i64 = sqlx::query_scalar("INSERT INTO children (name) VALUES ($1) RETURNING id")
            .bind(&payload.name)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(parent_id) = payload.parent_id {
            sqlx::query("INSERT INTO parent_children (parent_id, child_id) VALUES ($1, $2)")
                .bind(parent_id)
                .bind(child_id)
                .execute(&mut *tx)
                .await?;
        }

        for activity_id in &payload.activity_ids {
            sqlx::query("INSERT INTO child_activities (child_id, activity_id) VALUES ($1, $2)")
                .bind(child_id)
                .bind(activity_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Self::get(pool, child_id).await
    }

    /// Replace-all update: the stored parent and activity sets end up
    /// exactly as supplied, via delete-then-reinsert in one transaction.
    pub async fn update(pool: &PgPool, id: i64, payload: &ChildPayload) -> Result<Child, ApiError> {
        Self::get(pool, id).await?;
        validate_child(payload)?;

        let mut tx = pool.begin().await?;

        sqlx::query("UPDATE children SET name = $1 WHERE id = $2")
            .bind(&payload.name)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM parent_children WHERE child_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if let Some(parent_id) = payload.parent_id {
            sqlx::query("INSERT INTO parent_children (parent_id, child_id) VALUES ($1, $2)")
                .bind(parent_id)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("DELETE FROM child_activities WHERE child_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        for activity_id in &payload.activity_ids {
            sqlx::query("INSERT INTO child_activities (child_id, activity_id) VALUES ($1, $2)")
                .bind(id)
                .bind(activity_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Self::get(pool, id).await
    }

    /// Association rows go first so none of them outlives the child row.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        Self::get(pool, id).await?;

        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM parent_children WHERE child_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM child_activities WHERE child_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM children WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn add_activity(
        pool: &PgPool,
        child_id: i64,
        activity_id: i64,
    ) -> Result<Child, ApiError> {
        Self::get(pool, child_id).await?;
        if !ActivityService::exists(pool, activity_id).await? {
            return Err(ApiError::NotFound("Activity"));
        }

        let already_linked: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM child_activities WHERE child_id = $1 AND activity_id = $2)",
        )
        .bind(child_id)
        .bind(activity_id)
        .fetch_one(pool)
        .await?;

        if !already_linked {
            sqlx::query("INSERT INTO child_activities (child_id, activity_id) VALUES ($1, $2)")
                .bind(child_id)
                .bind(activity_id)
                .execute(pool)
                .await?;
        }

        Self::get(pool, child_id).await
    }

    pub async fn remove_activity(
        pool: &PgPool,
        child_id: i64,
        activity_id: i64,
    ) -> Result<Child, ApiError> {
        Self::get(pool, child_id).await?;

        sqlx::query("DELETE FROM child_activities WHERE child_id = $1 AND activity_id = $2")
            .bind(child_id)
            .bind(activity_id)
            .execute(pool)
            .await?;

        Self::get(pool, child_id).await
    }

    /// Exclusive-parent invariant: all prior rows for the child are removed
    /// before the new one is inserted, inside one transaction, so the child
    /// never ends up with zero or two committed parents.
    pub async fn set_parent(
        pool: &PgPool,
        child_id: i64,
        parent_id: i64,
    ) -> Result<Child, ApiError> {
        Self::get(pool, child_id).await?;
        if !ParentService::exists(pool, parent_id).await? {
            return Err(ApiError::NotFound("Parent"));
        }

        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM parent_children WHERE child_id = $1")
            .bind(child_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO parent_children (parent_id, child_id) VALUES ($1, $2)")
            .bind(parent_id)
            .bind(child_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Self::get(pool, child_id).await
    }

    pub async fn remove_parent(pool: &PgPool, child_id: i64) -> Result<Child, ApiError> {
        Self::get(pool, child_id).await?;

        sqlx::query("DELETE FROM parent_children WHERE child_id = $1")
            .bind(child_id)
            .execute(pool)
            .await?;

        Self::get(pool, child_id).await
    }

    pub async fn remove_from_parent(
        pool: &PgPool,
        child_id: i64,
        parent_id: i64,
    ) -> Result<Child, ApiError> {
        Self::get(pool, child_id).await?;

        sqlx::query("DELETE FROM parent_children WHERE child_id = $1 AND parent_id = $2")
            .bind(child_id)
            .bind(parent_id)
            .execute(pool)
            .await?;

        Self::get(pool, child_id).await
    }
}

fn hydrate(rows: &[ChildJoinRow]) -> Vec<Child> {
    collapse_rows(
        rows,
        |row| row.id,
        |row| Child {
            id: row.id,
            name: row.name.clone(),
            parent: row.parent(),
            activities: Vec::new(),
        },
        |row| row.a_id,
        |child, row| {
            if let Some(activity) = row.activity() {
                child.activities.push(activity);
            }
        },
    )
}

/// Find-by-id reduces to hydrating the restricted row set and taking the
/// first (only) distinct root.
fn hydrate_one(rows: &[ChildJoinRow]) -> Option<Child> {
    hydrate(rows).into_iter().next()
}

fn validate_child(payload: &ChildPayload) -> Result<(), ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::validation("Child name is required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        id: i64,
        name: &str,
        parent: Option<(i64, &str)>,
        activity: Option<(i64, &str)>,
    ) -> ChildJoinRow {
        ChildJoinRow {
            id,
            name: name.into(),
            p_id: parent.map(|(pid, _)| pid),
            parent_name: parent.map(|(_, n)| n.into()),
            parent_email: parent.map(|_| "p@x.com".into()),
            parent_phone: parent.map(|_| "0612345678".into()),
            a_id: activity.map(|(aid, _)| aid),
            activity_name: activity.map(|(_, n)| n.into()),
            activity_address: activity.map(|_| "somewhere".into()),
        }
    }

    #[test]
    fn one_child_many_activity_rows_collapse_to_one_entity() {
        let rows = vec![
            row(1, "Ana", Some((5, "J. Doe")), Some((10, "Swimming"))),
            row(1, "Ana", Some((5, "J. Doe")), Some((11, "Riding"))),
            row(1, "Ana", Some((5, "J. Doe")), Some((10, "Swimming"))),
        ];

        let children = hydrate(&rows);
        assert_eq!(children.len(), 1);
        let child = &children[0];
        assert_eq!(child.name, "Ana");
        assert_eq!(child.parent.as_ref().unwrap().id, 5);
        let ids: Vec<i64> = child.activities.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[test]
    fn null_relation_columns_attach_nothing() {
        let rows = vec![row(1, "Ana", None, None)];

        let children = hydrate(&rows);
        assert_eq!(children.len(), 1);
        assert!(children[0].parent.is_none());
        assert!(children[0].activities.is_empty());
    }

    #[test]
    fn children_keep_first_seen_order_and_own_activity_sets() {
        let rows = vec![
            row(2, "Ben", None, Some((10, "Swimming"))),
            row(1, "Ana", Some((5, "J. Doe")), Some((10, "Swimming"))),
            row(2, "Ben", None, Some((11, "Riding"))),
        ];

        let children = hydrate(&rows);
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].id, 2);
        assert_eq!(children[0].activities.len(), 2);
        assert_eq!(children[1].id, 1);
        assert_eq!(children[1].activities.len(), 1);
    }

    #[test]
    fn find_by_id_hydration_reports_absence_for_no_rows() {
        assert!(hydrate_one(&[]).is_none());
    }

    #[test]
    fn rejects_blank_child_name() {
        let payload = ChildPayload { name: " ".into(), parent_id: None, activity_ids: vec![] };
        assert!(validate_child(&payload).is_err());
    }
}
