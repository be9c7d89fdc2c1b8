//! Lab performance metrics from a PageSpeed-style provider
//!
//! Request: `GET {base-url}?url=..&strategy=mobile|desktop&category=performance&key=..`
//!
//! Response fields read (all optional):
//! - `lighthouseResult.categories.performance.score` (0.0..=1.0)
//! - `lighthouseResult.audits.<metric>.numericValue`
//! - audits whose `details.type` is `opportunity`, with `details.overallSavingsMs`

use crate::config::ProviderConfig;
use crate::enrich::{as_number, cancellable, ensure_success, EnrichError};
use crate::model::{PerformanceChannel, PerformanceResult, PerformanceSuggestion};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

const PROVIDER: &str = "performance";

/// Lab runs are slow; the provider regularly needs close to a minute
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Debug, Clone)]
pub struct PerformanceEnricher {
    client: Client,
    config: ProviderConfig,
}

/// One strategy's parsed response
struct ChannelReport {
    channel: PerformanceChannel,
    suggestions: Vec<PerformanceSuggestion>,
}

impl PerformanceEnricher {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    /// Fetches mobile and desktop metrics concurrently
    ///
    /// When a strategy is configured only that one is requested. Returns
    /// `None` when unconfigured or when every requested strategy failed.
    pub async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Option<PerformanceResult> {
        let (key, base) = self.config.credentials()?;

        let wants = |strategy: &str| {
            self.config
                .strategy
                .as_deref()
                .map_or(true, |configured| configured == strategy)
        };

        let (mobile, desktop) = tokio::join!(
            self.run_strategy(wants("mobile"), "mobile", key, base, url, cancel),
            self.run_strategy(wants("desktop"), "desktop", key, base, url, cancel),
        );

        if mobile.is_none() && desktop.is_none() {
            return None;
        }

        let mut suggestions = Vec::new();
        let mut take = |report: Option<ChannelReport>| {
            report.map(|r| {
                if suggestions.is_empty() {
                    suggestions = r.suggestions;
                }
                r.channel
            })
        };
        let mobile = take(mobile);
        let desktop = take(desktop);

        Some(PerformanceResult {
            mobile,
            desktop,
            suggestions,
        })
    }

    async fn run_strategy(
        &self,
        enabled: bool,
        strategy: &str,
        key: &str,
        base: &str,
        url: &Url,
        cancel: &CancellationToken,
    ) -> Option<ChannelReport> {
        if !enabled {
            return None;
        }

        let request = async {
            let response = self
                .client
                .get(base)
                .query(&[
                    ("url", url.as_str()),
                    ("strategy", strategy),
                    ("category", "performance"),
                    ("key", key),
                ])
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await?;
            let response = ensure_success(PROVIDER, response).await?;
            let body: Value = response.json().await?;
            parse_report(strategy, &body)
        };

        match cancellable(cancel, request).await {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!("Performance lookup ({}) for {} failed: {}", strategy, url, e);
                None
            }
        }
    }
}

fn parse_report(strategy: &str, body: &Value) -> Result<ChannelReport, EnrichError> {
    let lighthouse = body
        .get("lighthouseResult")
        .filter(|v| v.is_object())
        .ok_or_else(|| EnrichError::Parse {
            provider: PROVIDER,
            message: "missing lighthouseResult".to_string(),
        })?;

    let metric = |audit: &str| {
        lighthouse
            .get("audits")
            .and_then(|audits| audits.get(audit))
            .and_then(|a| a.get("numericValue"))
            .and_then(as_number)
    };

    let score = lighthouse
        .pointer("/categories/performance/score")
        .and_then(as_number)
        .map(|s| (s.clamp(0.0, 1.0) * 100.0).round() as u32);

    let channel = PerformanceChannel {
        strategy: strategy.to_string(),
        score,
        largest_contentful_paint_ms: metric("largest-contentful-paint"),
        first_contentful_paint_ms: metric("first-contentful-paint"),
        cumulative_layout_shift: metric("cumulative-layout-shift"),
        total_blocking_time_ms: metric("total-blocking-time"),
    };

    Ok(ChannelReport {
        channel,
        suggestions: parse_opportunities(lighthouse),
    })
}

/// Opportunity audits that did not fully pass
fn parse_opportunities(lighthouse: &Value) -> Vec<PerformanceSuggestion> {
    let Some(audits) = lighthouse.get("audits").and_then(Value::as_object) else {
        return Vec::new();
    };

    audits
        .iter()
        .filter(|(_, audit)| {
            audit.pointer("/details/type").and_then(Value::as_str) == Some("opportunity")
        })
        .filter(|(_, audit)| audit.get("score").and_then(as_number).map_or(true, |s| s < 1.0))
        .filter_map(|(id, audit)| {
            let title = audit.get("title").and_then(Value::as_str)?.trim().to_string();
            Some(PerformanceSuggestion {
                id: id.clone(),
                title,
                description: audit
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                estimated_savings_ms: audit
                    .pointer("/details/overallSavingsMs")
                    .and_then(as_number),
            })
        })
        .collect()
}
