//! Site-Auditor: single-URL performance, SEO and accessibility audits
//!
//! This crate fetches one page, extracts SEO and accessibility signals from it,
//! probes a bounded sample of its links, enriches the result with optional
//! third-party providers and turns everything into weighted scores and
//! recommendations.

pub mod analysis;
pub mod config;
pub mod enrich;
pub mod fetch;
pub mod history;
pub mod model;
pub mod output;
pub mod queue;
pub mod recommend;
pub mod score;
pub mod seo;
pub mod url;

use thiserror::Error;

/// Main error type for Site-Auditor operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("History error: {0}")]
    History(#[from] history::HistoryError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Analysis cancelled")]
    Cancelled,

    #[error("Scan queue is closed")]
    QueueClosed,

    #[error("Scan queue is full ({limit} jobs pending)")]
    QueueFull { limit: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL is empty")]
    Empty,
}

/// Result type alias for Site-Auditor operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use analysis::{AnalysisOrchestrator, AnalysisThrottler};
pub use config::Config;
pub use model::{AnalysisMode, AnalysisRequest, AnalysisResult};
pub use queue::{ScanJobState, ScanJobStatus, ScanQueue};
pub use url::normalize_url;
