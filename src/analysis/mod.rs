//! Analysis pipeline
//!
//! This module contains:
//! - The orchestrator that runs one analysis end to end
//! - The process-wide throttle bounding concurrent analyses

mod orchestrator;
mod throttle;

pub use orchestrator::AnalysisOrchestrator;
pub use throttle::{AnalysisThrottler, ThrottlePermit, DEFAULT_MAX_CONCURRENT_SCANS};
