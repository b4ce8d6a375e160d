use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::progress::tracker::ProgressView;
use crate::roadmap::WeekRecord;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct ReplaceWeeksRequest {
    pub weeks: Vec<WeekRecord>,
}

#[derive(Deserialize)]
pub struct ProjectLinkUpdate {
    pub project_link: String,
}

/// GET /api/v1/progress
pub async fn handle_get_progress(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Json<ProgressView> {
    let slot = state.registry.slot(params.user_id).await;
    let view = slot.tracker.lock().await.view();
    Json(view)
}

/// PUT /api/v1/progress
pub async fn handle_replace_progress(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
    Json(req): Json<ReplaceWeeksRequest>,
) -> Json<ProgressView> {
    let slot = state.registry.slot(params.user_id).await;
    let mut tracker = slot.tracker.lock().await;
    tracker.replace_all(req.weeks).await;
    Json(tracker.view())
}

/// POST /api/v1/progress/weeks/:index/toggle
pub async fn handle_toggle_week(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ProgressView>, AppError> {
    let slot = state.registry.slot(params.user_id).await;
    let mut tracker = slot.tracker.lock().await;
    tracker.toggle_completion(index).await?;
    Ok(Json(tracker.view()))
}

/// PUT /api/v1/progress/weeks/:index/project
pub async fn handle_set_project_link(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(params): Query<UserIdQuery>,
    Json(req): Json<ProjectLinkUpdate>,
) -> Result<Json<ProgressView>, AppError> {
    let slot = state.registry.slot(params.user_id).await;
    let mut tracker = slot.tracker.lock().await;
    tracker.set_project_link(index, req.project_link).await?;
    Ok(Json(tracker.view()))
}
