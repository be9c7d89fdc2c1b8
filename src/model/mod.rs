//! Data model shared across the analysis pipeline
//!
//! Every type here serializes to camelCase JSON so results can be handed to
//! any caller (HTTP surface, report renderer, history file) unchanged.

mod enrichment;
mod result;
mod seo;

pub use enrichment::{
    AiInsightsResult, OffPageSeoResult, PerformanceChannel, PerformanceResult,
    PerformanceSuggestion,
};
pub use result::{AnalysisResult, NetworkResult, ScoreResult};
pub use seo::{BrokenLink, SeoResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Analysis preset trading completeness for latency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnalysisMode {
    /// Static HTML only, small link sample, no provider enrichment except AI
    #[default]
    Fast,
    /// Headless rendering, performance and off-page enrichment, larger link sample
    Deep,
}

impl AnalysisMode {
    /// Maximum number of links probed by the link-health checker
    pub fn link_sample_size(&self) -> usize {
        match self {
            Self::Fast => 10,
            Self::Deep => 30,
        }
    }

    /// Per-link request timeout
    pub fn link_timeout(&self) -> Duration {
        match self {
            Self::Fast => Duration::from_secs(5),
            Self::Deep => Duration::from_secs(12),
        }
    }

    /// Number of link checks allowed in flight at once
    pub fn link_concurrency(&self) -> usize {
        match self {
            Self::Fast => 2,
            Self::Deep => 5,
        }
    }

    pub fn renders_dom(&self) -> bool {
        matches!(self, Self::Deep)
    }

    pub fn fetches_performance(&self) -> bool {
        !matches!(self, Self::Fast)
    }

    pub fn fetches_off_page(&self) -> bool {
        matches!(self, Self::Deep)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Deep => "deep",
        }
    }
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "deep" => Ok(Self::Deep),
            other => Err(format!("unknown analysis mode '{}', expected fast or deep", other)),
        }
    }
}

/// Immutable input to one analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub url: String,
    #[serde(default)]
    pub mode: AnalysisMode,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>, mode: AnalysisMode) -> Self {
        Self {
            url: url.into(),
            mode,
        }
    }

    pub fn fast(url: impl Into<String>) -> Self {
        Self::new(url, AnalysisMode::Fast)
    }

    pub fn deep(url: impl Into<String>) -> Self {
        Self::new(url, AnalysisMode::Deep)
    }
}
