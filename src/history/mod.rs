//! Scan history persistence
//!
//! This module defines the `HistoryStore` interface and the JSON flat-file
//! backend. Each completed analysis can be projected into a compact
//! `ScanRecord` and appended to the store.

mod json_file;
mod traits;

pub use json_file::JsonFileHistory;
pub use traits::{HistoryError, HistoryResult, HistoryStore, ScanRecord};
