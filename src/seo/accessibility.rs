use crate::seo::{attr_trimmed, select_all};
use scraper::{ElementRef, Html};
use std::collections::HashSet;

const LANDMARK_ELEMENTS: &[&str] = &["header", "nav", "main", "aside", "footer"];

const LANDMARK_ROLES: &[&str] = &[
    "banner",
    "navigation",
    "main",
    "complementary",
    "contentinfo",
    "search",
    "region",
    "form",
];

/// Input types that never need a visible label
const UNLABELED_INPUT_TYPES: &[&str] = &["hidden", "submit", "button", "reset", "image"];

/// True when `<html lang>` is present and non-blank
pub fn has_language_attribute(document: &Html) -> bool {
    select_all(document, "html")
        .first()
        .and_then(|html| attr_trimmed(html, "lang"))
        .is_some()
}

/// True when the page offers a "skip to content" style link
///
/// Either an in-page anchor whose fragment mentions main/content/skip, or
/// a link whose text reads like a skip link.
pub fn has_skip_link(document: &Html) -> bool {
    select_all(document, "a").iter().any(|link| {
        let fragment_matches = link
            .value()
            .attr("href")
            .map(str::trim)
            .and_then(|href| href.strip_prefix('#'))
            .map(str::to_lowercase)
            .is_some_and(|f| f.contains("main") || f.contains("content") || f.contains("skip"));

        let text = link.text().collect::<String>().trim().to_lowercase();
        let text_matches = text.starts_with("skip")
            || text.contains("skip to content")
            || text.contains("skip navigation");

        fragment_matches || text_matches
    })
}

/// Counts semantic landmark elements and ARIA landmark roles
///
/// An element counts once even when it is both (`<nav role="navigation">`).
pub fn count_landmarks(document: &Html) -> usize {
    select_all(document, "*")
        .iter()
        .filter(|element| {
            let by_name = LANDMARK_ELEMENTS.contains(&element.value().name());
            let by_role = element
                .value()
                .attr("role")
                .map(|r| r.trim().to_ascii_lowercase())
                .is_some_and(|r| LANDMARK_ROLES.contains(&r.as_str()));
            by_name || by_role
        })
        .count()
}

/// Counts form controls without an accessible label
///
/// A control is labelled by `<label for=id>`, an enclosing `<label>`, or a
/// non-blank `aria-label`/`aria-labelledby`.
pub fn count_unlabeled_controls(document: &Html) -> usize {
    let labelled_ids: HashSet<&str> = select_all(document, "label[for]")
        .iter()
        .filter_map(|label| attr_trimmed(label, "for"))
        .collect();

    select_all(document, "input, textarea, select")
        .iter()
        .filter(|control| needs_label(control))
        .filter(|control| !is_labelled(control, &labelled_ids))
        .count()
}

fn needs_label(control: &ElementRef<'_>) -> bool {
    if control.value().name() != "input" {
        return true;
    }
    let input_type = control
        .value()
        .attr("type")
        .map(|t| t.trim().to_ascii_lowercase())
        .unwrap_or_else(|| "text".to_string());
    !UNLABELED_INPUT_TYPES.contains(&input_type.as_str())
}

fn is_labelled(control: &ElementRef<'_>, labelled_ids: &HashSet<&str>) -> bool {
    if attr_trimmed(control, "aria-label").is_some()
        || attr_trimmed(control, "aria-labelledby").is_some()
    {
        return true;
    }

    if attr_trimmed(control, "id").is_some_and(|id| labelled_ids.contains(id)) {
        return true;
    }

    control.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|element| element.name() == "label")
    })
}
