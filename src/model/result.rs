use crate::model::{AiInsightsResult, OffPageSeoResult, PerformanceResult, SeoResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of the primary page fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkResult {
    pub url: String,
    /// Final HTTP status, or 0 when no response was received
    pub status_code: u16,
    pub response_time_ms: u64,
    pub checked_at: DateTime<Utc>,
    pub error_message: Option<String>,
    /// 1 when the final URL differs from the requested one, else 0
    pub redirect_count: u32,
}

impl NetworkResult {
    pub fn unreachable(url: impl Into<String>, response_time_ms: u64, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            response_time_ms,
            checked_at: Utc::now(),
            error_message: Some(error.into()),
            redirect_count: 0,
        }
    }

    pub fn is_reachable(&self) -> bool {
        self.status_code != 0
    }

    /// True when no response arrived or the server answered with 4xx/5xx
    pub fn is_error(&self) -> bool {
        self.status_code == 0 || self.status_code >= 400
    }
}

/// Derived scores, each in 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub overall: u32,
    pub seo: u32,
    pub speed: u32,
}

/// Aggregate root of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub url: String,
    pub checked_at: DateTime<Utc>,
    pub network: NetworkResult,
    pub seo: SeoResult,
    pub score: ScoreResult,
    pub performance: Option<PerformanceResult>,
    pub off_page_seo: Option<OffPageSeoResult>,
    pub ai_insights: Option<AiInsightsResult>,
}

impl AnalysisResult {
    /// Minimal result for input that never made it past URL validation
    pub fn unreachable(url: impl Into<String>, error: impl Into<String>) -> Self {
        let url = url.into();
        let network = NetworkResult::unreachable(url.clone(), 0, error);
        Self {
            checked_at: network.checked_at,
            seo: SeoResult::empty(url.trim().to_ascii_lowercase().starts_with("https://")),
            url,
            network,
            score: ScoreResult::default(),
            performance: None,
            off_page_seo: None,
            ai_insights: None,
        }
    }

    /// Returns a copy with AI insights attached
    pub fn with_ai_insights(self, ai_insights: Option<AiInsightsResult>) -> Self {
        Self {
            ai_insights,
            ..self
        }
    }
}
