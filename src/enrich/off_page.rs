//! Off-page authority metrics
//!
//! Request: `GET {base-url}?target=<host>` with `Authorization: Bearer <key>`.
//! The metrics object may sit at the top level, under `result`/`data`, or
//! be the first element of an array there. Several common field spellings
//! are accepted.

use crate::config::ProviderConfig;
use crate::enrich::{cancellable, ensure_success, first_number, EnrichError};
use crate::model::OffPageSeoResult;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

const PROVIDER: &str = "off-page";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct OffPageEnricher {
    client: Client,
    config: ProviderConfig,
}

impl OffPageEnricher {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    pub async fn fetch(&self, url: &Url, cancel: &CancellationToken) -> Option<OffPageSeoResult> {
        let (key, base) = self.config.credentials()?;
        let target = url.host_str()?;

        let request = async {
            let response = self
                .client
                .get(base)
                .query(&[("target", target)])
                .bearer_auth(key)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await?;
            let response = ensure_success(PROVIDER, response).await?;
            let body: Value = response.json().await?;
            parse_metrics(&body)
        };

        match cancellable(cancel, request).await {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                tracing::warn!("Off-page lookup for {} failed: {}", target, e);
                None
            }
        }
    }
}

fn parse_metrics(body: &Value) -> Result<OffPageSeoResult, EnrichError> {
    let metrics = locate_metrics(body);

    let result = OffPageSeoResult {
        domain_authority: first_number(
            metrics,
            &["domain_authority", "domainAuthority", "authority", "domain_rank"],
        ),
        backlinks: first_number(metrics, &["backlinks", "backlinks_count", "backlinksCount"])
            .map(to_count),
        referring_domains: first_number(
            metrics,
            &["referring_domains", "referringDomains", "refdomains"],
        )
        .map(to_count),
        spam_score: first_number(metrics, &["spam_score", "spamScore"]),
    };

    if result.is_empty() {
        return Err(EnrichError::Parse {
            provider: PROVIDER,
            message: "no recognised metrics in response".to_string(),
        });
    }
    Ok(result)
}

fn locate_metrics(body: &Value) -> &Value {
    for key in ["result", "data"] {
        match body.get(key) {
            Some(Value::Object(_)) => return &body[key],
            Some(Value::Array(items)) if !items.is_empty() => return &items[0],
            _ => {}
        }
    }
    body
}

fn to_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}
