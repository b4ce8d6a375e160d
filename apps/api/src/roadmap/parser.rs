//! Week parser — turns a free-text roadmap into ordered `WeekRecord`s.
//!
//! A line starting (after optional whitespace) with `week <digits>` opens a
//! new week. Everything up to the next marker becomes that week's details.
//! Text before the first marker is dropped. The match is purely syntactic:
//! a detail line such as `Week 3 recap` opens week 3.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::roadmap::models::WeekRecord;

/// `week` is matched case-insensitively; the rest of the line keeps its case.
static WEEK_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?i:week)\s*([0-9]+):?\s*(.*)$").expect("week marker pattern is valid")
});

/// Parses raw roadmap text into weeks, in marker order.
///
/// Never fails. Input without any marker yields an empty vector, which
/// callers report as "no structured plan detected".
pub fn parse_weeks(raw: &str) -> Vec<WeekRecord> {
    let mut weeks = Vec::new();
    let mut current: Option<WeekRecord> = None;

    for line in raw.lines() {
        if let Some(caps) = WEEK_MARKER.captures(line) {
            if let Some(done) = current.take() {
                weeks.push(done);
            }
            current = Some(WeekRecord::new(&caps[1], &caps[2]));
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(week) = current.as_mut() {
            week.details.push(trimmed.to_string());
        }
    }

    if let Some(done) = current {
        weeks.push(done);
    }
    weeks
}
