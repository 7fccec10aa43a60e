use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::transport::{Transport, TransportJoinRow, TransportPayload};
use crate::services::activities::ActivityService;
use crate::services::parents::ParentService;
use crate::services::vehicles::{self, VehicleService};

/// Transport with its activity, owned vehicle and the vehicle's parent.
/// To-one relations only, so each row maps to exactly one transport.
const TRANSPORT_JOIN: &str = "SELECT t.id, t.transport_type, t.date_start, t.date_end, t.pickup_location,
       a.id AS a_id, a.name AS activity_name, a.address AS activity_address,
       v.id AS v_id, v.parent_id, v.available_seats,
       p.id AS p_id, p.name AS parent_name, p.email AS parent_email, p.phone AS parent_phone
 FROM transports t
 JOIN activities a ON a.id = t.activity_id
 JOIN vehicles v ON v.id = t.vehicle_id
 LEFT JOIN parents p ON p.id = v.parent_id";

pub struct TransportService;

impl TransportService {
    pub async fn list(pool: &PgPool) -> Result<Vec<Transport>, ApiError> {
        let rows = sqlx::query_as::<_, TransportJoinRow>(&format!("{TRANSPORT_JOIN} ORDER BY t.id"))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(TransportJoinRow::into_transport).collect())
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<Transport, ApiError> {
        let row = sqlx::query_as::<_, TransportJoinRow>(&format!("{TRANSPORT_JOIN} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.map(TransportJoinRow::into_transport)
            .ok_or(ApiError::NotFound("Transport"))
    }

    pub async fn list_by_activity(
        pool: &PgPool,
        activity_id: i64,
    ) -> Result<Vec<Transport>, ApiError> {
        if !ActivityService::exists(pool, activity_id).await? {
            return Err(ApiError::NotFound("Activity"));
        }

        let rows = sqlx::query_as::<_, TransportJoinRow>(&format!(
            "{TRANSPORT_JOIN} WHERE t.activity_id = $1 ORDER BY t.id"
        ))
        .bind(activity_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(TransportJoinRow::into_transport).collect())
    }

    pub async fn list_by_parent(pool: &PgPool, parent_id: i64) -> Result<Vec<Transport>, ApiError> {
        if !ParentService::exists(pool, parent_id).await? {
            return Err(ApiError::NotFound("Parent"));
        }

        let rows = sqlx::query_as::<_, TransportJoinRow>(&format!(
            "{TRANSPORT_JOIN} WHERE v.parent_id = $1 ORDER BY t.id"
        ))
        .bind(parent_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(TransportJoinRow::into_transport).collect())
    }

    pub async fn list_by_vehicle(
        pool: &PgPool,
        vehicle_id: i64,
    ) -> Result<Vec<Transport>, ApiError> {
        if !VehicleService::exists(pool, vehicle_id).await? {
            return Err(ApiError::NotFound("Vehicle"));
        }

        let rows = sqlx::query_as::<_, TransportJoinRow>(&format!(
            "{TRANSPORT_JOIN} WHERE t.vehicle_id = $1 ORDER BY t.id"
        ))
        .bind(vehicle_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(TransportJoinRow::into_transport).collect())
    }

    /// Create a transport together with its owned vehicle: the vehicle row
    /// goes in first so the transport can reference its generated id, both
    /// inside one transaction. A failed transport insert rolls the vehicle
    /// back, leaving no orphan.
    pub async fn create(pool: &PgPool, payload: &TransportPayload) -> Result<Transport, ApiError> {
        validate_transport(payload)?;

        let vehicle = payload
            .vehicle
            .as_ref()
            .ok_or_else(|| ApiError::validation("Vehicle data is required"))?;
        let parent_id = vehicle
            .parent_id
            .ok_or_else(|| ApiError::validation("Vehicle parent is required"))?;
        vehicles::validate_seats(vehicle.available_seats)?;

        if !ActivityService::exists(pool, payload.activity_id).await? {
            return Err(ApiError::NotFound("Activity"));
        }
        if !ParentService::exists(pool, parent_id).await? {
            return Err(ApiError::NotFound("Parent"));
        }

        let mut tx = pool.begin().await?;

        let vehicle_id: i64 = sqlx::query_scalar(
            "INSERT INTO vehicles (parent_id, available_seats) VALUES ($1, $2) RETURNING id",
        )
        .bind(parent_id)
        .bind(vehicle.available_seats)
        .fetch_one(&mut *tx)
        .await?;

        let transport_id: i64 = sqlx::query_scalar(
            "INSERT INTO transports
                 (transport_type, date_start, date_end, pickup_location, activity_id, vehicle_id)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id",
        )
        .bind(payload.transport_type)
        .bind(payload.date_start)
        .bind(payload.date_end)
        .bind(&payload.pickup_location)
        .bind(payload.activity_id)
        .bind(vehicle_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Self::get(pool, transport_id).await
    }

    /// Update the transport row and, when vehicle data accompanies the
    /// request, the vehicle addressed by the transport's existing vehicle
    /// reference, atomically across both updates.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        payload: &TransportPayload,
    ) -> Result<Transport, ApiError> {
        let vehicle_id = Self::vehicle_id_of(pool, id)
            .await?
            .ok_or(ApiError::NotFound("Transport"))?;

        validate_transport(payload)?;
        if let Some(vehicle) = &payload.vehicle {
            vehicles::validate_seats(vehicle.available_seats)?;
        }
        if !ActivityService::exists(pool, payload.activity_id).await? {
            return Err(ApiError::NotFound("Activity"));
        }

        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE transports
             SET transport_type = $1,
                 date_start = $2,
                 date_end = $3,
                 pickup_location = $4,
                 activity_id = $5
             WHERE id = $6",
        )
        .bind(payload.transport_type)
        .bind(payload.date_start)
        .bind(payload.date_end)
        .bind(&payload.pickup_location)
        .bind(payload.activity_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if let Some(vehicle) = &payload.vehicle {
            sqlx::query("UPDATE vehicles SET available_seats = $1 WHERE id = $2")
                .bind(vehicle.available_seats)
                .bind(vehicle_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Self::get(pool, id).await
    }

    /// Delete a transport and cascade to its owned vehicle as an explicit
    /// two-step atomic unit. The vehicle id is resolved before the delete;
    /// the vehicle row is only touched when the transport delete actually
    /// removed a row.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        let vehicle_id = Self::vehicle_id_of(pool, id)
            .await?
            .ok_or(ApiError::NotFound("Transport"))?;

        let mut tx = pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM transports WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() > 0 {
            sqlx::query("DELETE FROM vehicles WHERE id = $1")
                .bind(vehicle_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn vehicle_id_of(pool: &PgPool, transport_id: i64) -> Result<Option<i64>, ApiError> {
        let vehicle_id: Option<i64> =
            sqlx::query_scalar("SELECT vehicle_id FROM transports WHERE id = $1")
                .bind(transport_id)
                .fetch_optional(pool)
                .await?;
        Ok(vehicle_id)
    }
}

fn validate_transport(payload: &TransportPayload) -> Result<(), ApiError> {
    if payload.date_end <= payload.date_start {
        return Err(ApiError::validation("End date must be after start date"));
    }
    if payload.pickup_location.trim().is_empty() {
        return Err(ApiError::validation("Pickup location is required"));
    }
    Ok(())
}
