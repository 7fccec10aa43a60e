use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::models::vehicle::{CreateVehiclePayload, UpdateVehiclePayload, Vehicle, VehicleWithParent};
use crate::services::vehicles::VehicleService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub required: i32,
}

pub async fn list_vehicles(
    State(state): State<AppState>,
) -> Result<Json<Vec<VehicleWithParent>>, ApiError> {
    Ok(Json(VehicleService::list(&state.db).await?))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VehicleWithParent>, ApiError> {
    Ok(Json(VehicleService::get(&state.db, id).await?))
}

pub async fn list_vehicles_by_parent(
    State(state): State<AppState>,
    Path(parent_id): Path<i64>,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
    Ok(Json(VehicleService::list_by_parent(&state.db, parent_id).await?))
}

pub async fn list_vehicles_by_transport(
    State(state): State<AppState>,
    Path(transport_id): Path<i64>,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
    Ok(Json(VehicleService::list_by_transport(&state.db, transport_id).await?))
}

pub async fn list_available_vehicles(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
    Ok(Json(VehicleService::list_available(&state.db, query.required).await?))
}

pub async fn check_vehicle_availability(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, ApiError> {
    let available = VehicleService::check_availability(&state.db, id, query.required).await?;
    Ok(Json(json!({ "available": available })))
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    Json(body): Json<CreateVehiclePayload>,
) -> Result<(StatusCode, Json<VehicleWithParent>), ApiError> {
    let vehicle = VehicleService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(vehicle)))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateVehiclePayload>,
) -> Result<Json<VehicleWithParent>, ApiError> {
    Ok(Json(VehicleService::update(&state.db, id, &body).await?))
}

pub async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    VehicleService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
