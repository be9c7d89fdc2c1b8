//! Background scan queue
//!
//! Jobs are accepted immediately, processed one at a time in enqueue order by
//! a single worker task, and polled by id through a concurrent status map.

mod job;
mod worker;

pub use job::{ScanJob, ScanJobState, ScanJobStatus};
pub use worker::ScanQueue;
