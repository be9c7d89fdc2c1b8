//! SEO and accessibility extraction
//!
//! This module turns raw HTML (static or DOM-rendered) into a `SeoResult`:
//! - Title, description, canonical and robots handling
//! - Link discovery and internal/external classification
//! - Accessibility heuristics (language, skip links, landmarks, form labels)
//! - JSON-LD structured data types

mod accessibility;
mod extractor;
mod structured_data;

pub use extractor::{build_seo_result, DomCounts, SeoExtraction};
pub use structured_data::extract_structured_data;

use scraper::{ElementRef, Html, Selector};

/// Selects all elements matching `css`; an invalid selector matches nothing
pub(crate) fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// Returns the trimmed attribute value when present and non-blank
pub(crate) fn attr_trimmed<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
