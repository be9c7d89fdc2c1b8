use crate::AuditError;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Default number of analyses allowed to run at once
pub const DEFAULT_MAX_CONCURRENT_SCANS: usize = 4;

/// Process-wide cap on concurrently running analyses
///
/// Cloning shares the same permits. Construct one and hand it to every
/// orchestrator that should count against the same ceiling.
#[derive(Debug, Clone)]
pub struct AnalysisThrottler {
    permits: Arc<Semaphore>,
    capacity: usize,
}

/// A held analysis slot, returned to the throttler when dropped
#[derive(Debug)]
pub struct ThrottlePermit {
    _permit: OwnedSemaphorePermit,
}

impl ThrottlePermit {
    /// Releases the slot early; equivalent to dropping the permit
    pub fn release(self) {}
}

impl AnalysisThrottler {
    /// Creates a throttler with `max_concurrent` slots (at least one)
    pub fn new(max_concurrent: usize) -> Self {
        let capacity = max_concurrent.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Waits for a free slot
    ///
    /// # Errors
    ///
    /// `AuditError::Cancelled` when `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<ThrottlePermit, AuditError> {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AuditError::Cancelled),
            permit = Arc::clone(&self.permits).acquire_owned() => permit,
        };
        // The semaphore is owned here and never closed.
        let permit = permit.map_err(|_| AuditError::Cancelled)?;
        Ok(ThrottlePermit { _permit: permit })
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for AnalysisThrottler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENT_SCANS)
    }
}
