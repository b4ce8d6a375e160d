// Roadmap generation.
// Implements: the pluggable generation source (LLM or remote function), the
// generate → parse → install flow, and its HTTP handlers.
// LLM calls go through llm_client only.

pub mod function_source;
pub mod handlers;
pub mod prompts;
pub mod service;
pub mod source;

pub use function_source::FunctionRoadmapSource;
pub use source::{GenerationOutcome, LlmRoadmapSource, RoadmapSource};
