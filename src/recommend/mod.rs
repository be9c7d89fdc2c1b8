//! Rule-based recommendations
//!
//! Rules are evaluated in a fixed order and each fires at most once, so the
//! output order is stable and needs no deduplication.

mod checklist;

pub use checklist::{parse_checklist, ChecklistSection};

use crate::model::AnalysisResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Speed score below which a generic slow-load item is produced
const SLOW_SPEED_THRESHOLD: u32 = 70;
const MAX_CITED_LINKS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommendationCategory {
    Network,
    Performance,
    #[serde(rename = "SEO")]
    Seo,
    Security,
    Accessibility,
    Links,
}

impl RecommendationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "Network",
            Self::Performance => "Performance",
            Self::Seo => "SEO",
            Self::Security => "Security",
            Self::Accessibility => "Accessibility",
            Self::Links => "Links",
        }
    }
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub title: String,
    pub description: String,
}

impl Recommendation {
    fn new(
        category: RecommendationCategory,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Builds the recommendation list for a finished analysis
pub fn build_recommendations(result: &AnalysisResult) -> Vec<Recommendation> {
    use RecommendationCategory::*;

    let mut items = Vec::new();
    let network = &result.network;
    let seo = &result.seo;

    if network.status_code == 0 {
        let reason = network.error_message.as_deref().unwrap_or("no response");
        items.push(Recommendation::new(
            Network,
            "Site unreachable",
            format!(
                "The page could not be fetched ({}). Check DNS, TLS and server availability.",
                reason
            ),
        ));
    } else if network.status_code >= 400 {
        items.push(Recommendation::new(
            Network,
            format!("HTTP {} error", network.status_code),
            format!(
                "The page answered with status {}. Make sure it returns 200 for visitors and crawlers.",
                network.status_code
            ),
        ));
    }

    if let Some(suggestion) = result.performance.as_ref().and_then(|p| p.top_suggestion()) {
        let description = match (suggestion.description.as_deref(), suggestion.estimated_savings_ms) {
            (Some(text), Some(ms)) => format!("{} Estimated savings: {:.0} ms.", text, ms),
            (Some(text), None) => text.to_string(),
            (None, Some(ms)) => format!("Estimated savings: {:.0} ms.", ms),
            (None, None) => "Address this opportunity to improve load performance.".to_string(),
        };
        items.push(Recommendation::new(Performance, suggestion.title.clone(), description));
    } else if result.score.speed < SLOW_SPEED_THRESHOLD {
        items.push(Recommendation::new(
            Performance,
            "Improve page load speed",
            "The page loads slowly. Reduce server response time, compress assets and defer non-critical scripts.",
        ));
    }

    if !seo.is_indexable {
        items.push(Recommendation::new(
            Seo,
            "Page is not indexable",
            "A noindex directive in a robots meta tag or X-Robots-Tag header keeps this page out of search results.",
        ));
    }

    if !seo.has_viewport {
        items.push(Recommendation::new(
            Seo,
            "Missing viewport meta tag",
            "Add <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"> so the page renders well on mobile devices.",
        ));
    }

    if !seo.is_https {
        items.push(Recommendation::new(
            Security,
            "Serve the page over HTTPS",
            "Browsers flag plain HTTP pages as insecure and search engines prefer HTTPS.",
        ));
    }

    if seo.image_count > 0 && seo.images_without_alt > 0 {
        items.push(Recommendation::new(
            Accessibility,
            "Images missing alt text",
            format!(
                "{} of {} images lack an alt attribute. Describe each meaningful image for screen readers and search engines.",
                seo.images_without_alt, seo.image_count
            ),
        ));
    }

    if !seo.has_language_attribute {
        items.push(Recommendation::new(
            Accessibility,
            "Missing lang attribute",
            "Declare the page language on the <html> element, for example <html lang=\"en\">.",
        ));
    }

    if seo.unlabeled_form_controls > 0 {
        items.push(Recommendation::new(
            Accessibility,
            "Form controls without labels",
            format!(
                "{} form controls have no associated label. Add a <label> or an aria-label to each.",
                seo.unlabeled_form_controls
            ),
        ));
    }

    if seo.broken_link_count > 0 {
        let examples: Vec<&str> = seo
            .broken_links
            .iter()
            .take(MAX_CITED_LINKS)
            .map(|l| l.url.as_str())
            .collect();
        items.push(Recommendation::new(
            Links,
            "Fix broken links",
            format!(
                "{} sampled links are broken, for example: {}.",
                seo.broken_link_count,
                examples.join(", ")
            ),
        ));
    }

    items
}
