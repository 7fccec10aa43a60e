use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiError;
use crate::models::transport::{Transport, TransportPayload};
use crate::services::transports::TransportService;
use crate::AppState;

pub async fn list_transports(
    State(state): State<AppState>,
) -> Result<Json<Vec<Transport>>, ApiError> {
    Ok(Json(TransportService::list(&state.db).await?))
}

pub async fn get_transport(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Transport>, ApiError> {
    Ok(Json(TransportService::get(&state.db, id).await?))
}

pub async fn list_transports_by_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> Result<Json<Vec<Transport>>, ApiError> {
    Ok(Json(TransportService::list_by_activity(&state.db, activity_id).await?))
}

pub async fn list_transports_by_parent(
    State(state): State<AppState>,
    Path(parent_id): Path<i64>,
) -> Result<Json<Vec<Transport>>, ApiError> {
    Ok(Json(TransportService::list_by_parent(&state.db, parent_id).await?))
}

pub async fn list_transports_by_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<i64>,
) -> Result<Json<Vec<Transport>>, ApiError> {
    Ok(Json(TransportService::list_by_vehicle(&state.db, vehicle_id).await?))
}

pub async fn create_transport(
    State(state): State<AppState>,
    Json(body): Json<TransportPayload>,
) -> Result<(StatusCode, Json<Transport>), ApiError> {
    let transport = TransportService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(transport)))
}

pub async fn update_transport(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TransportPayload>,
) -> Result<Json<Transport>, ApiError> {
    Ok(Json(TransportService::update(&state.db, id, &body).await?))
}

pub async fn delete_transport(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    TransportService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
