use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiError;
use crate::models::child::{Child, ChildPayload};
use crate::services::children::ChildService;
use crate::AppState;

pub async fn list_children(State(state): State<AppState>) -> Result<Json<Vec<Child>>, ApiError> {
    Ok(Json(ChildService::list(&state.db).await?))
}

pub async fn get_child(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Child>, ApiError> {
    Ok(Json(ChildService::get(&state.db, id).await?))
}

pub async fn list_children_by_parent(
    State(state): State<AppState>,
    Path(parent_id): Path<i64>,
) -> Result<Json<Vec<Child>>, ApiError> {
    Ok(Json(ChildService::list_by_parent(&state.db, parent_id).await?))
}

pub async fn list_children_by_activity(
    State(state): State<AppState>,
    Path(activity_id): Path<i64>,
) -> Result<Json<Vec<Child>>, ApiError> {
    Ok(Json(ChildService::list_by_activity(&state.db, activity_id).await?))
}

pub async fn create_child(
    State(state): State<AppState>,
    Json(body): Json<ChildPayload>,
) -> Result<(StatusCode, Json<Child>), ApiError> {
    let child = ChildService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

pub async fn update_child(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ChildPayload>,
) -> Result<Json<Child>, ApiError> {
    Ok(Json(ChildService::update(&state.db, id, &body).await?))
}

pub async fn delete_child(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ChildService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_activity_to_child(
    State(state): State<AppState>,
    Path((child_id, activity_id)): Path<(i64, i64)>,
) -> Result<Json<Child>, ApiError> {
    Ok(Json(ChildService::add_activity(&state.db, child_id, activity_id).await?))
}

pub async fn remove_activity_from_child(
    State(state): State<AppState>,
    Path((child_id, activity_id)): Path<(i64, i64)>,
) -> Result<Json<Child>, ApiError> {
    Ok(Json(ChildService::remove_activity(&state.db, child_id, activity_id).await?))
}

pub async fn set_parent_for_child(
    State(state): State<AppState>,
    Path((child_id, parent_id)): Path<(i64, i64)>,
) -> Result<Json<Child>, ApiError> {
    Ok(Json(ChildService::set_parent(&state.db, child_id, parent_id).await?))
}

pub async fn remove_parent_from_child(
    State(state): State<AppState>,
    Path(child_id): Path<i64>,
) -> Result<Json<Child>, ApiError> {
    Ok(Json(ChildService::remove_parent(&state.db, child_id).await?))
}

pub async fn remove_child_from_parent(
    State(state): State<AppState>,
    Path((child_id, parent_id)): Path<(i64, i64)>,
) -> Result<Json<Child>, ApiError> {
    Ok(Json(ChildService::remove_from_parent(&state.db, child_id, parent_id).await?))
}
