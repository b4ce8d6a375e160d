//! Generation sources — pluggable backends that turn a topic into roadmap text.
//!
//! `AppState` holds an `Arc<dyn RoadmapSource>`, picked at startup from config.
//! An explicit refusal from the backend is `Ok(Rejected)`; transport-level
//! failure is `Err`. Callers branch on both.

use async_trait::async_trait;
use tracing::info;

use crate::generation::prompts::{build_roadmap_prompt, ROADMAP_SYSTEM};
use crate::llm_client::{is_rejection_status, LlmClient, LlmError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Raw roadmap text, not yet parsed.
    Roadmap(String),
    /// The backend answered with an error message meant for the learner.
    Rejected(String),
}

#[async_trait]
pub trait RoadmapSource: Send + Sync {
    async fn generate(
        &self,
        topic: &str,
        current_knowledge: &str,
    ) -> Result<GenerationOutcome, LlmError>;

    /// Backend name for logs: "llm" | "function".
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmRoadmapSource
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmRoadmapSource {
    llm: LlmClient,
}

impl LlmRoadmapSource {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

/// Splits an LLM result into a learner-facing refusal or a transport failure.
fn outcome_from(result: Result<String, LlmError>) -> Result<GenerationOutcome, LlmError> {
    match result {
        Ok(text) => Ok(GenerationOutcome::Roadmap(text)),
        Err(LlmError::Api { status, message }) if is_rejection_status(status) => {
            Ok(GenerationOutcome::Rejected(message))
        }
        Err(e) => Err(e),
    }
}

#[async_trait]
impl RoadmapSource for LlmRoadmapSource {
    async fn generate(
        &self,
        topic: &str,
        current_knowledge: &str,
    ) -> Result<GenerationOutcome, LlmError> {
        let prompt = build_roadmap_prompt(topic, current_knowledge);
        let outcome = outcome_from(self.llm.complete(&prompt, ROADMAP_SYSTEM).await)?;
        if let GenerationOutcome::Roadmap(text) = &outcome {
            info!("Generated roadmap for '{}' ({} chars)", topic.trim(), text.len());
        }
        Ok(outcome)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, message: &str) -> LlmError {
        LlmError::Api {
            status,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_text_is_a_roadmap() {
        assert_eq!(
            outcome_from(Ok("Week 1: Basics".to_string())).unwrap(),
            GenerationOutcome::Roadmap("Week 1: Basics".to_string())
        );
    }

    #[test]
    fn test_client_errors_are_rejections() {
        for status in [400, 403, 413] {
            assert_eq!(
                outcome_from(Err(api(status, "prompt is too long"))).unwrap(),
                GenerationOutcome::Rejected("prompt is too long".to_string()),
                "status {status}"
            );
        }
    }

    #[test]
    fn test_transport_failures_stay_errors() {
        let failures = [
            api(429, "rate limited"),
            api(500, "internal"),
            api(503, "overloaded"),
            LlmError::RateLimited { retries: 3 },
            LlmError::EmptyContent,
            LlmError::Parse(serde_json::from_str::<u32>("nope").unwrap_err()),
        ];
        for failure in failures {
            let shown = failure.to_string();
            assert!(outcome_from(Err(failure)).is_err(), "{shown} became an outcome");
        }
    }
}
