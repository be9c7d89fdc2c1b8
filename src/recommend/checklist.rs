//! Splits AI insight text into titled checklist sections
//!
//! The heuristics are line based: Markdown headings and lines ending in a
//! colon open a section, every other non-blank line becomes an item.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const DEFAULT_SECTION: &str = "Checklist";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSection {
    pub title: String,
    pub items: Vec<String>,
}

impl ChecklistSection {
    fn named(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }
}

struct Patterns {
    heading: Regex,
    bullet: Regex,
    checkbox: Regex,
}

fn patterns() -> Option<&'static Patterns> {
    static PATTERNS: OnceLock<Option<Patterns>> = OnceLock::new();
    PATTERNS
        .get_or_init(|| {
            let compiled = (|| {
                Some(Patterns {
                    heading: Regex::new(r"^#{1,6}\s+(.*?)[\s#]*$").ok()?,
                    bullet: Regex::new(r"^(?:[-*•]|\d+[.)])(?:\s+|$)").ok()?,
                    checkbox: Regex::new(r"^\[[ xX]?\]\s*").ok()?,
                })
            })();
            if compiled.is_none() {
                tracing::error!("Failed to compile checklist patterns");
            }
            compiled
        })
        .as_ref()
}

/// Parses `text` into sections, dropping sections without items
pub fn parse_checklist(text: &str) -> Vec<ChecklistSection> {
    let Some(patterns) = patterns() else {
        return Vec::new();
    };

    let mut sections = Vec::new();
    let mut current = ChecklistSection::named(DEFAULT_SECTION);

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(title) = heading_title(patterns, line) {
            let finished = std::mem::replace(&mut current, ChecklistSection::named(title));
            if !finished.items.is_empty() {
                sections.push(finished);
            }
            continue;
        }

        let item = patterns.bullet.replace(line, "");
        let item = patterns.checkbox.replace(&item, "");
        let item = item.trim();
        if !item.is_empty() {
            current.items.push(item.to_string());
        }
    }

    if !current.items.is_empty() {
        sections.push(current);
    }
    sections
}

fn heading_title(patterns: &Patterns, line: &str) -> Option<String> {
    if let Some(captures) = patterns.heading.captures(line) {
        let title = captures.get(1).map_or("", |m| m.as_str()).trim();
        return Some(strip_colon(title).to_string());
    }

    let is_explicit = (line.ends_with(':') || line.ends_with('：'))
        && line.chars().count() > 1
        && !patterns.bullet.is_match(line);
    is_explicit.then(|| strip_colon(line).to_string())
}

fn strip_colon(title: &str) -> &str {
    title.trim_end_matches([':', '：']).trim()
}
