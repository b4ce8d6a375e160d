//! Generation flow — validate, claim the learner's slot, clear, generate,
//! parse, install.
//!
//! The previous roadmap is cleared as soon as a valid request starts, so a
//! failed generation leaves the learner with an empty tracker rather than the
//! old plan. A second request for the same learner while one is in flight is
//! refused. There is no cancellation: if the caller goes away the future is
//! dropped and nothing is installed.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::{AppError, GENERATION_RETRY_MESSAGE};
use crate::generation::source::{GenerationOutcome, RoadmapSource};
use crate::progress::{ProgressView, TrackerRegistry};
use crate::roadmap::{outline, parse_weeks, OutlineBlock};

pub const TOPIC_REQUIRED_MESSAGE: &str = "Please enter what you want to learn";

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub user_id: Uuid,
    pub topic: String,
    #[serde(default)]
    pub current_knowledge: String,
}

#[derive(Debug, Serialize)]
pub struct GeneratedRoadmap {
    pub roadmap: String,
    pub outline: Vec<OutlineBlock>,
    /// False when the text had no week markers ("no structured plan detected").
    pub structured: bool,
    pub progress: ProgressView,
}

pub async fn generate_roadmap(
    registry: &TrackerRegistry,
    source: &dyn RoadmapSource,
    request: &GenerateRequest,
) -> Result<GeneratedRoadmap, AppError> {
    let topic = request.topic.trim();
    if topic.is_empty() {
        return Err(AppError::Validation(TOPIC_REQUIRED_MESSAGE.to_string()));
    }

    let slot = registry.slot(request.user_id).await;
    let _guard = slot.begin_generation().ok_or_else(|| {
        AppError::Conflict("A roadmap is already being generated for this user".to_string())
    })?;

    slot.tracker.lock().await.replace_all(Vec::new()).await;

    info!(
        "Generating roadmap for user {} on '{topic}' via {}",
        request.user_id,
        source.backend()
    );
    let roadmap = match source.generate(topic, &request.current_knowledge).await {
        Ok(GenerationOutcome::Roadmap(text)) => text,
        Ok(GenerationOutcome::Rejected(message)) => {
            warn!("Generation rejected for user {}: {message}", request.user_id);
            return Err(AppError::Remote(message));
        }
        Err(e) => {
            warn!("Generation failed for user {}: {e}", request.user_id);
            return Err(AppError::Remote(GENERATION_RETRY_MESSAGE.to_string()));
        }
    };

    let weeks = parse_weeks(&roadmap);
    let structured = !weeks.is_empty();
    if !structured {
        info!("No structured plan detected for user {}", request.user_id);
    }

    let progress = {
        let mut tracker = slot.tracker.lock().await;
        tracker.replace_all(weeks).await;
        tracker.view()
    };

    Ok(GeneratedRoadmap {
        outline: outline(&roadmap),
        roadmap,
        structured,
        progress,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::LlmError;
    use crate::progress::{MemorySnapshotStore, SnapshotStore};

    /// Replays one canned answer and counts calls.
    struct ScriptedSource {
        answer: fn() -> Result<GenerationOutcome, LlmError>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(answer: fn() -> Result<GenerationOutcome, LlmError>) -> Self {
            Self {
                answer,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl RoadmapSource for ScriptedSource {
        async fn generate(
            &self,
            _topic: &str,
            _current_knowledge: &str,
        ) -> Result<GenerationOutcome, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.answer)()
        }

        fn backend(&self) -> &'static str {
            "scripted"
        }
    }

    const ROADMAP: &str = "Month 1: Foundations\nWeek 1: Basics\n- Learn variables\n- Learn loops\nWeek 2 Advanced topics\n- Closures\n";

    fn make_request(user_id: Uuid, topic: &str) -> GenerateRequest {
        GenerateRequest {
            user_id,
            topic: topic.to_string(),
            current_knowledge: String::new(),
        }
    }

    async fn seeded_registry(user_id: Uuid) -> (TrackerRegistry, Arc<MemorySnapshotStore>) {
        let store = Arc::new(MemorySnapshotStore::new());
        let registry = TrackerRegistry::new(store.clone(), "pathway:progress", 100);
        let seeded = parse_weeks("Week 1: Old plan\nOld detail");
        store
            .save(&registry.slot_key(user_id), &seeded)
            .await
            .unwrap();
        (registry, store)
    }

    #[tokio::test]
    async fn test_success_installs_parsed_weeks_and_persists() {
        let user = Uuid::new_v4();
        let (registry, store) = seeded_registry(user).await;
        let source = ScriptedSource::new(|| Ok(GenerationOutcome::Roadmap(ROADMAP.to_string())));

        let result = generate_roadmap(&registry, &source, &make_request(user, "Rust"))
            .await
            .unwrap();

        assert!(result.structured);
        assert_eq!(result.progress.total, 2);
        assert_eq!(result.progress.weeks[0].details, vec!["- Learn variables", "- Learn loops"]);
        assert_eq!(result.progress.percentage, 0.0);
        assert!(matches!(result.outline[0], OutlineBlock::Heading { .. }));

        let persisted = store.load(&registry.slot_key(user)).await.unwrap().unwrap();
        assert_eq!(persisted, result.progress.weeks);
    }

    #[tokio::test]
    async fn test_marker_free_roadmap_is_unstructured_not_an_error() {
        let user = Uuid::new_v4();
        let (registry, _) = seeded_registry(user).await;
        let source =
            ScriptedSource::new(|| Ok(GenerationOutcome::Roadmap("Just read the book.".to_string())));

        let result = generate_roadmap(&registry, &source, &make_request(user, "Rust"))
            .await
            .unwrap();
        assert!(!result.structured);
        assert_eq!(result.progress.total, 0);
        assert_eq!(result.outline.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_topic_is_rejected_without_clearing() {
        let user = Uuid::new_v4();
        let (registry, _) = seeded_registry(user).await;
        let source = ScriptedSource::new(|| Ok(GenerationOutcome::Roadmap(ROADMAP.to_string())));

        let err = generate_roadmap(&registry, &source, &make_request(user, "   "))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(ref m) if m == TOPIC_REQUIRED_MESSAGE));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        let slot = registry.slot(user).await;
        assert_eq!(slot.tracker.lock().await.weeks()[0].title, "Old plan");
    }

    #[tokio::test]
    async fn test_rejection_surfaces_message_and_keeps_optimistic_clear() {
        let user = Uuid::new_v4();
        let (registry, store) = seeded_registry(user).await;
        let source =
            ScriptedSource::new(|| Ok(GenerationOutcome::Rejected("quota exceeded".to_string())));

        let err = generate_roadmap(&registry, &source, &make_request(user, "Rust"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Remote(ref m) if m == "quota exceeded"));
        let slot = registry.slot(user).await;
        assert!(slot.tracker.lock().await.weeks().is_empty());
        assert!(store
            .load(&registry.slot_key(user))
            .await
            .unwrap()
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_uses_generic_message() {
        let user = Uuid::new_v4();
        let (registry, _) = seeded_registry(user).await;
        let source = ScriptedSource::new(|| Err(LlmError::RateLimited { retries: 3 }));

        let err = generate_roadmap(&registry, &source, &make_request(user, "Rust"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Remote(ref m) if m == GENERATION_RETRY_MESSAGE));
        let slot = registry.slot(user).await;
        assert!(slot.tracker.lock().await.weeks().is_empty());
        assert!(slot.begin_generation().is_some());
    }

    #[tokio::test]
    async fn test_second_request_while_busy_is_a_conflict() {
        let user = Uuid::new_v4();
        let (registry, _) = seeded_registry(user).await;
        let source = ScriptedSource::new(|| Ok(GenerationOutcome::Roadmap(ROADMAP.to_string())));

        let slot = registry.slot(user).await;
        let in_flight = slot.begin_generation().unwrap();

        let err = generate_roadmap(&registry, &source, &make_request(user, "Rust"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(slot.tracker.lock().await.weeks().len(), 1);

        drop(in_flight);
        generate_roadmap(&registry, &source, &make_request(user, "Rust"))
            .await
            .unwrap();
        assert_eq!(slot.tracker.lock().await.weeks().len(), 2);
    }

    #[tokio::test]
    async fn test_later_generation_fully_replaces_earlier() {
        let user = Uuid::new_v4();
        let (registry, _) = seeded_registry(user).await;
        let first = ScriptedSource::new(|| Ok(GenerationOutcome::Roadmap(ROADMAP.to_string())));
        let second =
            ScriptedSource::new(|| Ok(GenerationOutcome::Roadmap("Week 5: Only this".to_string())));

        generate_roadmap(&registry, &first, &make_request(user, "Rust"))
            .await
            .unwrap();
        let result = generate_roadmap(&registry, &second, &make_request(user, "Rust"))
            .await
            .unwrap();

        assert_eq!(result.progress.total, 1);
        assert_eq!(result.progress.weeks[0].week_number, "5");
    }
}
