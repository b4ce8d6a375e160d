use std::sync::Arc;

use crate::generation::RoadmapSource;
use crate::progress::TrackerRegistry;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Per-learner trackers, restored lazily from the snapshot store.
    pub registry: Arc<TrackerRegistry>,
    /// Pluggable generation backend: LLM by default, remote function when
    /// `ROADMAP_FUNCTION_URL` is set.
    pub source: Arc<dyn RoadmapSource>,
}
