// Prompt constants for roadmap generation.

use crate::llm_client::prompts::PLAIN_TEXT_INSTRUCTION;

/// System prompt for roadmap generation.
pub const ROADMAP_SYSTEM: &str = "You are an experienced mentor who designs practical, \
    project-driven learning roadmaps. You are concise and concrete.";

/// Roadmap prompt template. Replace `{topic}` and `{current_knowledge}` before sending.
pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"Create a week-by-week learning roadmap for: {topic}

What the learner already knows: {current_knowledge}

Rules:
- Group weeks into months. Start each month with a line "Month N: <theme>".
- Start every week on its own line, exactly as "Week N: <title>", numbering weeks from 1 across the whole plan.
- Under each week, list 3 to 6 concrete tasks, one per line, each starting with "- ".
- Include one small project per week and link official documentation where useful (full https:// URLs).
- Skip anything the learner already knows.
"#;

/// Placeholder used when the learner leaves prior knowledge blank.
const NO_PRIOR_KNOWLEDGE: &str = "Nothing yet, complete beginner.";

/// Fills the roadmap template for one request.
pub fn build_roadmap_prompt(topic: &str, current_knowledge: &str) -> String {
    let knowledge = current_knowledge.trim();
    let knowledge = if knowledge.is_empty() {
        NO_PRIOR_KNOWLEDGE
    } else {
        knowledge
    };
    format!(
        "{}\n{}",
        ROADMAP_PROMPT_TEMPLATE
            .replace("{topic}", topic.trim())
            .replace("{current_knowledge}", knowledge),
        PLAIN_TEXT_INSTRUCTION
    )
}
