use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiError;
use crate::models::parent::{Parent, ParentPayload, ParentWithChildren};
use crate::services::parents::ParentService;
use crate::AppState;

pub async fn list_parents(State(state): State<AppState>) -> Result<Json<Vec<Parent>>, ApiError> {
    Ok(Json(ParentService::list(&state.db).await?))
}

pub async fn get_parent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Parent>, ApiError> {
    Ok(Json(ParentService::get(&state.db, id).await?))
}

pub async fn get_parent_with_children(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ParentWithChildren>, ApiError> {
    Ok(Json(ParentService::get_with_children(&state.db, id).await?))
}

pub async fn create_parent(
    State(state): State<AppState>,
    Json(body): Json<ParentPayload>,
) -> Result<(StatusCode, Json<Parent>), ApiError> {
    let parent = ParentService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(parent)))
}

pub async fn update_parent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ParentPayload>,
) -> Result<Json<Parent>, ApiError> {
    Ok(Json(ParentService::update(&state.db, id, &body).await?))
}

pub async fn delete_parent(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ParentService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
