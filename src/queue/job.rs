/// Scan job definitions and lifecycle states
use crate::model::{AnalysisRequest, AnalysisResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a queued analysis
///
/// `Pending -> Processing -> Completed | Failed`; there is no retry and no
/// way back from a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanJobState {
    /// Accepted and waiting for the worker
    Pending,
    /// Picked up by the worker
    Processing,
    /// Finished with a result
    Completed,
    /// Finished with an error message
    Failed,
}

impl ScanJobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for ScanJobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work handed to the worker
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub id: String,
    pub request: AnalysisRequest,
    pub save_history: bool,
}

/// Point-in-time view of a job
///
/// `result` is present only when `Completed` and `error` only when `Failed`;
/// the constructors are the only way to build a status, so both hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanJobStatus {
    pub job_id: String,
    pub state: ScanJobState,
    pub request: AnalysisRequest,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScanJobStatus {
    pub fn pending(job: &ScanJob) -> Self {
        let now = Utc::now();
        Self {
            job_id: job.id.clone(),
            state: ScanJobState::Pending,
            request: job.request.clone(),
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn processing(self) -> Self {
        self.advance(ScanJobState::Processing, None, None)
    }

    pub fn completed(self, result: AnalysisResult) -> Self {
        self.advance(ScanJobState::Completed, Some(result), None)
    }

    pub fn failed(self, error: impl Into<String>) -> Self {
        self.advance(ScanJobState::Failed, None, Some(error.into()))
    }

    fn advance(self, state: ScanJobState, result: Option<AnalysisResult>, error: Option<String>) -> Self {
        if !self.state.can_transition_to(state) {
            tracing::warn!("Job {} moved {} -> {} out of order", self.job_id, self.state, state);
        }
        Self {
            state,
            result,
            error,
            updated_at: Utc::now(),
            ..self
        }
    }
}
