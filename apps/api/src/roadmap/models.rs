use serde::{Deserialize, Serialize};

/// Title used when a week marker carries no text after its number.
pub const UNTITLED: &str = "Untitled";

/// One week of a parsed roadmap, plus the learner's progress on it.
///
/// Serialized with camelCase keys. Older snapshots used `week` and `project`,
/// both still accepted on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecord {
    /// Digits as written after the marker. Not assumed unique or contiguous.
    #[serde(alias = "week")]
    pub week_number: String,
    pub title: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, alias = "project")]
    pub project_link: String,
}

impl WeekRecord {
    /// Starts a fresh record for a week marker. Blank titles become `Untitled`;
    /// any other title is kept as written, trailing whitespace included.
    pub fn new(week_number: impl Into<String>, title: &str) -> Self {
        Self {
            week_number: week_number.into(),
            title: if title.trim().is_empty() {
                UNTITLED.to_string()
            } else {
                title.to_string()
            },
            details: Vec::new(),
            completed: false,
            project_link: String::new(),
        }
    }
}
