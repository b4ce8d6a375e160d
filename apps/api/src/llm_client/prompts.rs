// Shared prompt fragments.
// Each feature that calls the LLM keeps its own prompts.rs alongside it and
// pulls cross-cutting pieces from here.

/// Keeps completions as plain text the line-based parsers can read.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Respond in plain text only. \
    Do NOT use markdown headings, bold markers, tables, or code fences. \
    Put every item on its own line.";
