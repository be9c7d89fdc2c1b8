//! History traits and record types

use crate::model::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while reading or writing history
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("History lock poisoned")]
    Poisoned,
}

/// Result type for history operations
pub type HistoryResult<T> = Result<T, HistoryError>;

/// Compact, persisted summary of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    pub url: String,
    pub checked_at: DateTime<Utc>,
    pub overall_score: u32,
    pub seo_score: u32,
    pub speed_score: u32,
    pub status_code: u16,
    pub response_time_ms: u64,
    pub broken_link_count: usize,
    pub is_indexable: bool,
    /// Provider score for the mobile strategy, when performance data exists
    #[serde(default)]
    pub mobile_performance_score: Option<u32>,
}

impl ScanRecord {
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            url: result.url.clone(),
            checked_at: result.checked_at,
            overall_score: result.score.overall,
            seo_score: result.score.seo,
            speed_score: result.score.speed,
            status_code: result.network.status_code,
            response_time_ms: result.network.response_time_ms,
            broken_link_count: result.seo.broken_link_count,
            is_indexable: result.seo.is_indexable,
            mobile_performance_score: result
                .performance
                .as_ref()
                .and_then(|p| p.mobile.as_ref())
                .and_then(|m| m.score),
        }
    }
}

/// Trait for history backends
///
/// Implementations are shared between concurrent analyses and must
/// serialize their own writes.
pub trait HistoryStore: Send + Sync {
    /// Appends a record
    fn add_record(&self, record: ScanRecord) -> HistoryResult<()>;

    /// All records for `url`, most recent first
    ///
    /// The query is normalized the same way analyses normalize their input.
    fn get_history(&self, url: &str) -> HistoryResult<Vec<ScanRecord>>;

    /// Most recent record for `url`
    fn get_latest(&self, url: &str) -> HistoryResult<Option<ScanRecord>> {
        Ok(self.get_history(url)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PerformanceChannel, PerformanceResult, ScoreResult};

    #[test]
    fn test_record_from_result() {
        let mut result = AnalysisResult::unreachable("https://example.com/", "timeout");
        result.score = ScoreResult {
            overall: 40,
            seo: 70,
            speed: 20,
        };
        result.performance = Some(PerformanceResult {
            mobile: Some(PerformanceChannel {
                strategy: "mobile".to_string(),
                score: Some(35),
                largest_contentful_paint_ms: Some(4000.0),
                first_contentful_paint_ms: None,
                cumulative_layout_shift: None,
                total_blocking_time_ms: None,
            }),
            ..Default::default()
        });

        let record = ScanRecord::from_result(&result);
        assert_eq!(record.url, "https://example.com/");
        assert_eq!(record.overall_score, 40);
        assert_eq!(record.speed_score, 20);
        assert_eq!(record.status_code, 0);
        assert_eq!(record.mobile_performance_score, Some(35));
        assert_eq!(record.checked_at, result.checked_at);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let result = AnalysisResult::unreachable("https://example.com/", "timeout");
        let json = serde_json::to_value(ScanRecord::from_result(&result)).unwrap();
        assert!(json.get("overallScore").is_some());
        assert!(json.get("brokenLinkCount").is_some());
    }
}
