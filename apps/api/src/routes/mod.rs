pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::generation::handlers as generation;
use crate::progress::handlers as progress;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Roadmap API
        .route("/api/v1/roadmaps/generate", post(generation::handle_generate))
        .route("/api/v1/roadmaps/parse", post(generation::handle_parse))
        // Progress API
        .route(
            "/api/v1/progress",
            get(progress::handle_get_progress).put(progress::handle_replace_progress),
        )
        .route(
            "/api/v1/progress/weeks/:index/toggle",
            post(progress::handle_toggle_week),
        )
        .route(
            "/api/v1/progress/weeks/:index/project",
            put(progress::handle_set_project_link),
        )
        .with_state(state)
}
