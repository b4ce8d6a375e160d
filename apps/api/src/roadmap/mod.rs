// Roadmap text handling.
// Implements: week parsing, outline blocks for the full-roadmap view.
// Everything here is pure: no I/O, no LLM calls, no persistence.

pub mod models;
pub mod outline;
pub mod parser;

pub use models::WeekRecord;
pub use outline::{outline, OutlineBlock};
pub use parser::parse_weeks;
