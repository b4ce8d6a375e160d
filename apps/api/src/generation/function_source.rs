//! Remote "generate-roadmap" function backend.
//!
//! POSTs `{topic, currentKnowledge}` and expects `{roadmap}` on success or
//! `{error}` when the function itself declines. Non-2xx statuses and
//! unreadable bodies are transport failures.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::generation::source::{GenerationOutcome, RoadmapSource};
use crate::llm_client::LlmError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FunctionRequest<'a> {
    topic: &'a str,
    current_knowledge: &'a str,
}

#[derive(Debug, Deserialize)]
struct FunctionReply {
    roadmap: Option<String>,
    error: Option<String>,
}

impl FunctionReply {
    fn into_outcome(self) -> Result<GenerationOutcome, LlmError> {
        if let Some(error) = self.error {
            return Ok(GenerationOutcome::Rejected(error));
        }
        match self.roadmap {
            Some(roadmap) if !roadmap.trim().is_empty() => Ok(GenerationOutcome::Roadmap(roadmap)),
            _ => Err(LlmError::EmptyContent),
        }
    }
}

/// Non-2xx is a transport failure whatever the body says; only a 2xx reply
/// carrying `error` is a refusal.
fn outcome_from_response(status: StatusCode, body: String) -> Result<GenerationOutcome, LlmError> {
    if !status.is_success() {
        warn!("Roadmap function returned {status}: {body}");
        return Err(LlmError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    serde_json::from_str::<FunctionReply>(&body)?.into_outcome()
}

pub struct FunctionRoadmapSource {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl FunctionRoadmapSource {
    pub fn new(client: Client, url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            url,
            api_key,
        }
    }
}

#[async_trait]
impl RoadmapSource for FunctionRoadmapSource {
    async fn generate(
        &self,
        topic: &str,
        current_knowledge: &str,
    ) -> Result<GenerationOutcome, LlmError> {
        let mut request = self.client.post(&self.url).json(&FunctionRequest {
            topic,
            current_knowledge,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let outcome = outcome_from_response(status, body)?;
        if let GenerationOutcome::Roadmap(text) = &outcome {
            info!("Roadmap function answered for '{}' ({} chars)", topic.trim(), text.len());
        }
        Ok(outcome)
    }

    fn backend(&self) -> &'static str {
        "function"
    }
}
