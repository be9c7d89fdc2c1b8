//! Primary page fetch
//!
//! The probe never fails: transport errors, timeouts and cancellation are
//! all folded into a `NetworkResult` with status code 0.

use crate::model::NetworkResult;
use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything the rest of the pipeline needs from the primary fetch
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub network: NetworkResult,
    /// Response body; empty when unreachable
    pub html: String,
    /// Response headers; empty when unreachable
    pub headers: HeaderMap,
}

/// Performs a single GET against `url`
///
/// Elapsed time is measured with a monotonic clock from just before the
/// request to the end of the body read (or the failure).
pub async fn probe_url(
    client: &Client,
    url: &Url,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ProbeOutcome {
    let started = Instant::now();

    let fetch = async {
        let response = client.get(url.clone()).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let body = response.text().await?;
        Ok::<_, reqwest::Error>((status, final_url, headers, body))
    };

    let outcome = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err("Request cancelled".to_string()),
        result = fetch => result.map_err(describe_error),
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok((status_code, final_url, headers, html)) => {
            let redirect_count = u32::from(final_url != *url);
            tracing::debug!(
                "Probed {} -> HTTP {} in {}ms (redirected: {})",
                url,
                status_code,
                elapsed_ms,
                redirect_count > 0
            );
            ProbeOutcome {
                network: NetworkResult {
                    url: url.to_string(),
                    status_code,
                    response_time_ms: elapsed_ms,
                    checked_at: Utc::now(),
                    error_message: None,
                    redirect_count,
                },
                html,
                headers,
            }
        }
        Err(error) => {
            tracing::info!("Probe of {} failed after {}ms: {}", url, elapsed_ms, error);
            ProbeOutcome {
                network: NetworkResult::unreachable(url.as_str(), elapsed_ms, error),
                html: String::new(),
                headers: HeaderMap::new(),
            }
        }
    }
}

/// Renders a transport error with a short classification prefix
fn describe_error(error: reqwest::Error) -> String {
    if error.is_timeout() {
        format!("Request timeout: {}", error)
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else if error.is_redirect() {
        format!("Redirect error: {}", error)
    } else {
        error.to_string()
    }
}
