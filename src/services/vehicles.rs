use sqlx::PgPool;

use crate::error::ApiError;
use crate::models::vehicle::{
    CreateVehiclePayload, UpdateVehiclePayload, Vehicle, VehicleJoinRow, VehicleWithParent,
};
use crate::services::parents::ParentService;

const VEHICLE_JOIN: &str = "SELECT v.id, v.parent_id, v.available_seats,
       p.id AS p_id, p.name AS parent_name, p.email AS parent_email, p.phone AS parent_phone
 FROM vehicles v
 LEFT JOIN parents p ON p.id = v.parent_id";

pub struct VehicleService;

impl VehicleService {
    pub async fn list(pool: &PgPool) -> Result<Vec<VehicleWithParent>, ApiError> {
        let rows = sqlx::query_as::<_, VehicleJoinRow>(&format!("{VEHICLE_JOIN} ORDER BY v.id"))
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(VehicleJoinRow::into_vehicle).collect())
    }

    pub async fn get(pool: &PgPool, id: i64) -> Result<VehicleWithParent, ApiError> {
        let row = sqlx::query_as::<_, VehicleJoinRow>(&format!("{VEHICLE_JOIN} WHERE v.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
        row.map(VehicleJoinRow::into_vehicle)
            .ok_or(ApiError::NotFound("Vehicle"))
    }

    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, ApiError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM vehicles WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    pub async fn list_by_parent(pool: &PgPool, parent_id: i64) -> Result<Vec<Vehicle>, ApiError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT id, parent_id, available_seats FROM vehicles WHERE parent_id = $1 ORDER BY id",
        )
        .bind(parent_id)
        .fetch_all(pool)
        .await?;
        Ok(vehicles)
    }

    /// The vehicle owned by a transport (zero or one row).
    pub async fn list_by_transport(
        pool: &PgPool,
        transport_id: i64,
    ) -> Result<Vec<Vehicle>, ApiError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT v.id, v.parent_id, v.available_seats
             FROM vehicles v
             JOIN transports t ON t.vehicle_id = v.id
             WHERE t.id = $1",
        )
        .bind(transport_id)
        .fetch_all(pool)
        .await?;
        Ok(vehicles)
    }

    /// Vehicles with at least `required_seats` seats.
    pub async fn list_available(
        pool: &PgPool,
        required_seats: i32,
    ) -> Result<Vec<Vehicle>, ApiError> {
        let vehicles = sqlx::query_as::<_, Vehicle>(
            "SELECT id, parent_id, available_seats FROM vehicles
             WHERE available_seats >= $1 ORDER BY id",
        )
        .bind(required_seats)
        .fetch_all(pool)
        .await?;
        Ok(vehicles)
    }

    pub async fn create(
        pool: &PgPool,
        payload: &CreateVehiclePayload,
    ) -> Result<VehicleWithParent, ApiError> {
        validate_seats(payload.available_seats)?;
        if !ParentService::exists(pool, payload.parent_id).await? {
            return Err(ApiError::NotFound("Parent"));
        }

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO vehicles (parent_id, available_seats) VALUES ($1, $2) RETURNING id",
        )
        .bind(payload.parent_id)
        .bind(payload.available_seats)
        .fetch_one(pool)
        .await?;

        Self::get(pool, id).await
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        payload: &UpdateVehiclePayload,
    ) -> Result<VehicleWithParent, ApiError> {
        Self::get(pool, id).await?;
        if let Some(seats) = payload.available_seats {
            validate_seats(seats)?;
        }
        if let Some(parent_id) = payload.parent_id {
            if !ParentService::exists(pool, parent_id).await? {
                return Err(ApiError::NotFound("Parent"));
            }
        }

        sqlx::query(
            "UPDATE vehicles
             SET parent_id = COALESCE($1, parent_id),
                 available_seats = COALESCE($2, available_seats)
             WHERE id = $3",
        )
        .bind(payload.parent_id)
        .bind(payload.available_seats)
        .bind(id)
        .execute(pool)
        .await?;

        Self::get(pool, id).await
    }

    /// Delete guard: a vehicle still referenced by a transport is a
    /// conflict, not a delete.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<(), ApiError> {
        Self::get(pool, id).await?;

        if Self::used_by_transport(pool, id).await? {
            return Err(ApiError::conflict(
                "Cannot delete vehicle associated with transports",
            ));
        }

        sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn used_by_transport(pool: &PgPool, vehicle_id: i64) -> Result<bool, ApiError> {
        let used: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM transports WHERE vehicle_id = $1)")
                .bind(vehicle_id)
                .fetch_one(pool)
                .await?;
        Ok(used)
    }

    /// Read-time seat comparison; seats are never decremented automatically,
    /// accounting happens through explicit vehicle updates.
    pub async fn check_availability(
        pool: &PgPool,
        id: i64,
        required_seats: i32,
    ) -> Result<bool, ApiError> {
        let vehicle = Self::get(pool, id).await?;
        Ok(vehicle.available_seats >= required_seats)
    }
}

pub(crate) fn validate_seats(available_seats: i32) -> Result<(), ApiError> {
    if available_seats <= 0 {
        return Err(ApiError::validation(
            "Available seats must be greater than 0",
        ));
    }
    Ok(())
}
