use crate::recommend::{parse_checklist, ChecklistSection};
use serde::{Deserialize, Serialize};

/// Lab metrics for one device strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceChannel {
    /// `mobile` or `desktop`
    pub strategy: String,
    /// Provider performance score scaled to 0..=100
    pub score: Option<u32>,
    pub largest_contentful_paint_ms: Option<f64>,
    pub first_contentful_paint_ms: Option<f64>,
    pub cumulative_layout_shift: Option<f64>,
    pub total_blocking_time_ms: Option<f64>,
}

impl PerformanceChannel {
    pub fn has_metrics(&self) -> bool {
        self.largest_contentful_paint_ms.is_some()
            || self.first_contentful_paint_ms.is_some()
            || self.cumulative_layout_shift.is_some()
            || self.total_blocking_time_ms.is_some()
    }
}

/// An improvement opportunity reported by the performance provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSuggestion {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub estimated_savings_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResult {
    pub mobile: Option<PerformanceChannel>,
    pub desktop: Option<PerformanceChannel>,
    pub suggestions: Vec<PerformanceSuggestion>,
}

impl PerformanceResult {
    /// Channel used for scoring: mobile when it carries metrics, else desktop
    pub fn primary_channel(&self) -> Option<&PerformanceChannel> {
        self.mobile
            .as_ref()
            .filter(|c| c.has_metrics())
            .or_else(|| self.desktop.as_ref().filter(|c| c.has_metrics()))
            .or(self.mobile.as_ref())
            .or(self.desktop.as_ref())
    }

    /// Opportunity with the largest estimated savings, or the first one
    /// when none report savings
    pub fn top_suggestion(&self) -> Option<&PerformanceSuggestion> {
        let best = self
            .suggestions
            .iter()
            .filter(|s| s.estimated_savings_ms.is_some_and(|ms| ms > 0.0))
            .max_by(|a, b| {
                let a = a.estimated_savings_ms.unwrap_or_default();
                let b = b.estimated_savings_ms.unwrap_or_default();
                a.total_cmp(&b)
            });
        best.or_else(|| self.suggestions.first())
    }
}

/// Off-page authority metrics for the audited domain
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffPageSeoResult {
    pub domain_authority: Option<f64>,
    pub backlinks: Option<u64>,
    pub referring_domains: Option<u64>,
    pub spam_score: Option<f64>,
}

impl OffPageSeoResult {
    pub fn is_empty(&self) -> bool {
        self.domain_authority.is_none()
            && self.backlinks.is_none()
            && self.referring_domains.is_none()
            && self.spam_score.is_none()
    }
}

/// Markdown text produced by the AI insight provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsightsResult {
    pub text: String,
    pub model: Option<String>,
}

impl AiInsightsResult {
    pub fn checklist(&self) -> Vec<ChecklistSection> {
        parse_checklist(&self.text)
    }
}
