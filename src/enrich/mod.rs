//! Best-effort external enrichment
//!
//! Each provider is enabled only when its API key and base URL are both
//! configured. Providers never fail the analysis: every error is logged and
//! turned into an absent result.

mod ai;
mod off_page;
mod performance;
mod render;

pub use ai::{AiInsightsEnricher, AI_SYSTEM_PROMPT};
pub use off_page::OffPageEnricher;
pub use performance::PerformanceEnricher;
pub use render::{DomRenderer, RenderedPage};

use serde_json::Value;
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors raised inside an enricher before being downgraded to "absent"
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unexpected {provider} response: {message}")]
    Parse {
        provider: &'static str,
        message: String,
    },

    #[error("Request cancelled")]
    Cancelled,
}

/// Runs `request`, giving up as soon as `cancel` fires
async fn cancellable<T, F>(cancel: &CancellationToken, request: F) -> Result<T, EnrichError>
where
    F: Future<Output = Result<T, EnrichError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(EnrichError::Cancelled),
        result = request => result,
    }
}

/// Fails with `EnrichError::Status` unless the response is 2xx
async fn ensure_success(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, EnrichError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(EnrichError::Status {
        provider,
        status: status.as_u16(),
        body: body.chars().take(200).collect(),
    })
}

/// Reads a number that may be encoded as a JSON number or numeric string
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// First numeric value found under any of `keys`
fn first_number(object: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|key| object.get(*key).and_then(as_number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_number() {
        assert_eq!(as_number(&json!(42)), Some(42.0));
        assert_eq!(as_number(&json!(" 3.5 ")), Some(3.5));
        assert_eq!(as_number(&json!("n/a")), None);
        assert_eq!(as_number(&json!(null)), None);
    }

    #[test]
    fn test_first_number() {
        let value = json!({"domainAuthority": "55", "da": 10});
        assert_eq!(first_number(&value, &["domain_authority", "domainAuthority"]), Some(55.0));
        assert_eq!(first_number(&value, &["missing"]), None);
    }

    #[tokio::test]
    async fn test_cancellable_short_circuits() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result: Result<(), _> = cancellable(&cancel, std::future::pending()).await;
        assert!(matches!(result, Err(EnrichError::Cancelled)));
    }
}
