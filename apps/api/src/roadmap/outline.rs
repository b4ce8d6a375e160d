//! Outline — classifies raw roadmap lines into display blocks for the
//! "Full Roadmap" view. Independent of week parsing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static MONTH_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)month\s*[0-9]+").expect("month heading pattern is valid"));

static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://\S+").expect("link pattern is valid"));

const BULLET_MARKERS: &[char] = &['-', '*', '•'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutlineBlock {
    Heading { text: String, links: Vec<String> },
    Bullet { text: String, links: Vec<String> },
    Paragraph { text: String, links: Vec<String> },
}

/// Splits roadmap text into blocks, skipping blank lines.
///
/// - any line mentioning `month <n>` is a heading
/// - a line starting with `-`, `*` or `•` is a bullet, marker stripped
/// - everything else is a paragraph
pub fn outline(raw: &str) -> Vec<OutlineBlock> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(classify)
        .collect()
}

fn classify(line: &str) -> OutlineBlock {
    let links = extract_links(line);

    if MONTH_HEADING.is_match(line) {
        return OutlineBlock::Heading {
            text: line.to_string(),
            links,
        };
    }

    match line.strip_prefix(BULLET_MARKERS) {
        Some(rest) => OutlineBlock::Bullet {
            text: rest.trim_start().to_string(),
            links,
        },
        None => OutlineBlock::Paragraph {
            text: line.to_string(),
            links,
        },
    }
}

fn extract_links(line: &str) -> Vec<String> {
    LINK.find_iter(line).map(|m| m.as_str().to_string()).collect()
}
