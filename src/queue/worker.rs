//! Single-consumer scan worker
//!
//! Enqueue publishes to an unbounded channel read by one worker task, so jobs
//! start strictly in FIFO order. Each job still runs under the orchestrator's
//! throttle, and each runs in its own spawned task so a panic inside an
//! analysis is recorded as `Failed` instead of stopping the worker.
//!
//! The channel is unbounded unless `max-pending` is set. Finished statuses
//! are kept for `retention-secs` and swept out on the next enqueue.

use crate::analysis::AnalysisOrchestrator;
use crate::config::QueueConfig;
use crate::model::{AnalysisRequest, AnalysisResult};
use crate::queue::job::{ScanJob, ScanJobStatus};
use chrono::{DateTime, Utc};
use crate::url::normalize_url;
use crate::AuditError;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle for submitting jobs and polling their status
///
/// Clones share the same channel and status map. The worker stops once every
/// handle has been dropped and the remaining jobs have been processed.
#[derive(Debug, Clone)]
pub struct ScanQueue {
    sender: mpsc::UnboundedSender<ScanJob>,
    statuses: Arc<DashMap<String, ScanJobStatus>>,
    pending: Arc<AtomicUsize>,
    max_pending: Option<usize>,
    retention: Option<chrono::Duration>,
}

impl ScanQueue {
    /// Spawns the worker and returns the queue handle with the worker's
    /// join handle
    pub fn start(
        orchestrator: Arc<AnalysisOrchestrator>,
        config: &QueueConfig,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let statuses = Arc::new(DashMap::new());
        let pending = Arc::new(AtomicUsize::new(0));

        let worker = tokio::spawn(run_worker(
            orchestrator,
            receiver,
            Arc::clone(&statuses),
            Arc::clone(&pending),
        ));

        let queue = Self {
            sender,
            statuses,
            pending,
            max_pending: config.max_pending,
            retention: i64::try_from(config.retention_secs)
                .ok()
                .and_then(chrono::Duration::try_seconds),
        };
        (queue, worker)
    }

    /// Accepts a job and returns its id
    ///
    /// # Errors
    ///
    /// * `AuditError::InvalidUrl` - the URL cannot be normalized; no job is created
    /// * `AuditError::QueueFull` - `max-pending` jobs are already waiting
    /// * `AuditError::QueueClosed` - the worker has stopped
    pub fn enqueue(&self, request: AnalysisRequest, save_history: bool) -> Result<String, AuditError> {
        normalize_url(&request.url)?;
        self.reserve_slot()?;
        self.prune_finished();

        let job = ScanJob {
            id: uuid::Uuid::new_v4().to_string(),
            request,
            save_history,
        };
        let id = job.id.clone();
        self.statuses.insert(id.clone(), ScanJobStatus::pending(&job));

        if self.sender.send(job).is_err() {
            self.statuses.remove(&id);
            self.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(AuditError::QueueClosed);
        }

        tracing::debug!("Enqueued scan job {}", id);
        Ok(id)
    }

    /// Current status of a job, or `None` for an unknown id
    pub fn status(&self, job_id: &str) -> Option<ScanJobStatus> {
        self.statuses.get(job_id).map(|entry| entry.value().clone())
    }

    /// Jobs accepted but not yet picked up by the worker
    pub fn pending_jobs(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    fn prune_finished(&self) {
        if let Some(retention) = self.retention {
            let removed = prune_finished_before(&self.statuses, Utc::now() - retention);
            if removed > 0 {
                tracing::debug!("Dropped {} expired scan job statuses", removed);
            }
        }
    }

    fn reserve_slot(&self) -> Result<(), AuditError> {
        match self.max_pending {
            Some(limit) => self
                .pending
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    (n < limit).then_some(n + 1)
                })
                .map(|_| ())
                .map_err(|_| AuditError::QueueFull { limit }),
            None => {
                self.pending.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }
    }
}

async fn run_worker(
    orchestrator: Arc<AnalysisOrchestrator>,
    mut receiver: mpsc::UnboundedReceiver<ScanJob>,
    statuses: Arc<DashMap<String, ScanJobStatus>>,
    pending: Arc<AtomicUsize>,
) {
    tracing::debug!("Scan worker started");

    while let Some(job) = receiver.recv().await {
        pending.fetch_sub(1, Ordering::SeqCst);
        transition(&statuses, &job.id, ScanJobStatus::processing);
        tracing::info!("Processing scan job {} for {}", job.id, job.request.url);

        match run_job(&orchestrator, &job).await {
            Ok(result) => {
                tracing::info!("Scan job {} completed", job.id);
                transition(&statuses, &job.id, |status| status.completed(result));
            }
            Err(message) => {
                tracing::error!("Scan job {} failed: {}", job.id, message);
                transition(&statuses, &job.id, |status| status.failed(message));
            }
        }
    }

    tracing::debug!("Scan worker stopped");
}

async fn run_job(orchestrator: &Arc<AnalysisOrchestrator>, job: &ScanJob) -> Result<AnalysisResult, String> {
    let orchestrator = Arc::clone(orchestrator);
    let request = job.request.clone();
    let save_history = job.save_history;

    let task = tokio::spawn(async move {
        // Queued jobs are not cancellable once dequeued.
        let cancel = CancellationToken::new();
        orchestrator.analyze(&request, save_history, &cancel).await
    });

    match task.await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(e.to_string()),
        Err(e) => Err(format!("Analysis task aborted: {}", e)),
    }
}

/// Replaces the stored status with `advance(current)`
fn transition<F>(statuses: &DashMap<String, ScanJobStatus>, job_id: &str, advance: F)
where
    F: FnOnce(ScanJobStatus) -> ScanJobStatus,
{
    let Some(current) = statuses.get(job_id).map(|entry| entry.value().clone()) else {
        tracing::warn!("Status for scan job {} disappeared", job_id);
        return;
    };
    statuses.insert(job_id.to_string(), advance(current));
}

/// Removes terminal statuses last updated before `cutoff`
fn prune_finished_before(statuses: &DashMap<String, ScanJobStatus>, cutoff: DateTime<Utc>) -> usize {
    let before = statuses.len();
    statuses.retain(|_, status| !(status.state.is_terminal() && status.updated_at < cutoff));
    before.saturating_sub(statuses.len())
}
