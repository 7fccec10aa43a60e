use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::error::ApiError;
use crate::models::activity::{Activity, ActivityPayload};
use crate::services::activities::ActivityService;
use crate::AppState;

pub async fn list_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<Activity>>, ApiError> {
    Ok(Json(ActivityService::list(&state.db).await?))
}

pub async fn get_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Activity>, ApiError> {
    Ok(Json(ActivityService::get(&state.db, id).await?))
}

pub async fn create_activity(
    State(state): State<AppState>,
    Json(body): Json<ActivityPayload>,
) -> Result<(StatusCode, Json<Activity>), ApiError> {
    let activity = ActivityService::create(&state.db, &body).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

pub async fn update_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ActivityPayload>,
) -> Result<Json<Activity>, ApiError> {
    Ok(Json(ActivityService::update(&state.db, id, &body).await?))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ActivityService::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
