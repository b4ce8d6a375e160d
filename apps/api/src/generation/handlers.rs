//! Axum route handlers for the Roadmap API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::generation::service::{generate_roadmap, GenerateRequest, GeneratedRoadmap};
use crate::roadmap::{outline, parse_weeks, OutlineBlock, WeekRecord};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ParseRoadmapRequest {
    pub roadmap: String,
}

#[derive(Debug, Serialize)]
pub struct ParseRoadmapResponse {
    pub weeks: Vec<WeekRecord>,
    pub outline: Vec<OutlineBlock>,
    pub structured: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/roadmaps/generate
///
/// Full pipeline: validate → clear previous plan → generate → parse → install.
/// Returns the raw text, its outline, and the fresh progress view.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GeneratedRoadmap>, AppError> {
    let generated = generate_roadmap(&state.registry, state.source.as_ref(), &request).await?;
    Ok(Json(generated))
}

/// POST /api/v1/roadmaps/parse
///
/// Parses roadmap text without generating or storing anything.
pub async fn handle_parse(
    Json(request): Json<ParseRoadmapRequest>,
) -> Json<ParseRoadmapResponse> {
    let weeks = parse_weeks(&request.roadmap);
    Json(ParseRoadmapResponse {
        structured: !weeks.is_empty(),
        outline: outline(&request.roadmap),
        weeks,
    })
}
