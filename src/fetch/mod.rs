//! Network access for the analysis pipeline
//!
//! This module contains:
//! - The shared HTTP client builder
//! - The primary page probe (status, latency, redirect detection)
//! - The concurrent link-health checker

mod client;
mod links;
mod probe;

pub use client::build_http_client;
pub use links::LinkHealthChecker;
pub use probe::{probe_url, ProbeOutcome};
