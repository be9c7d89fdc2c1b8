//! Link-health checking
//!
//! Probes a bounded sample of links concurrently. Each link is checked in
//! its own task behind a counting semaphore, so a slow or dead host only
//! ever affects its own entry in the result.

use crate::model::{AnalysisMode, BrokenLink};
use crate::url::is_internal_link;
use crate::AuditError;
use reqwest::{Client, StatusCode};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Checks sampled links and reports the broken ones
#[derive(Debug, Clone)]
pub struct LinkHealthChecker {
    client: Client,
}

impl LinkHealthChecker {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns the broken links among the first N unique candidates
    ///
    /// Candidates are deduplicated case-insensitively (first occurrence
    /// wins) and capped by the mode's sample size. The result lists
    /// internal links first, then sorts by URL.
    ///
    /// # Errors
    ///
    /// Only `AuditError::Cancelled`; individual link failures are data.
    pub async fn find_broken_links(
        &self,
        site: &Url,
        links: &[String],
        mode: AnalysisMode,
        cancel: &CancellationToken,
    ) -> Result<Vec<BrokenLink>, AuditError> {
        let sample = sample_links(links, mode.link_sample_size());
        if sample.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            "Checking {} of {} links with concurrency {}",
            sample.len(),
            links.len(),
            mode.link_concurrency()
        );

        let gate = Arc::new(Semaphore::new(mode.link_concurrency()));
        let timeout = mode.link_timeout();
        let mut tasks = JoinSet::new();

        for link in sample {
            let client = self.client.clone();
            let gate = Arc::clone(&gate);
            tasks.spawn(async move {
                // The semaphore is never closed, so acquisition only fails on shutdown.
                let _permit = gate.acquire_owned().await.ok()?;
                check_link(&client, link, timeout).await
            });
        }

        let mut broken = Vec::new();
        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tasks.abort_all();
                    return Err(AuditError::Cancelled);
                }
                joined = tasks.join_next() => joined,
            };

            match joined {
                None => break,
                Some(Ok(Some(mut link))) => {
                    link.is_internal = is_internal_link(site, &link.url);
                    broken.push(link);
                }
                Some(Ok(None)) => {}
                Some(Err(e)) => tracing::warn!("Link check task failed: {}", e),
            }
        }

        sort_broken_links(&mut broken);
        Ok(broken)
    }
}

/// Deduplicates case-insensitively, drops blanks and keeps the first `cap`
fn sample_links(links: &[String], cap: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .filter(|l| seen.insert(l.to_lowercase()))
        .take(cap)
        .map(str::to_string)
        .collect()
}

/// Checks one link: HEAD first, GET when HEAD is not allowed
///
/// Returns `Some` when the link is broken. `is_internal` is filled in by
/// the caller.
async fn check_link(client: &Client, link: String, timeout: Duration) -> Option<BrokenLink> {
    let head = client.head(&link).timeout(timeout).send().await;

    let response = match head {
        Ok(resp) if resp.status() == StatusCode::METHOD_NOT_ALLOWED => {
            client.get(&link).timeout(timeout).send().await
        }
        other => other,
    };

    match response {
        Ok(resp) if resp.status().is_success() => None,
        Ok(resp) => {
            let status = resp.status();
            tracing::debug!("Broken link {} -> HTTP {}", link, status.as_u16());
            Some(BrokenLink {
                url: link,
                is_internal: false,
                status_code: status.as_u16(),
                reason: status.canonical_reason().map(str::to_string),
            })
        }
        Err(e) => {
            tracing::debug!("Broken link {} -> {}", link, e);
            Some(BrokenLink {
                url: link,
                is_internal: false,
                status_code: 0,
                reason: Some(e.to_string()),
            })
        }
    }
}

/// Internal links first, then alphabetical by URL
fn sort_broken_links(links: &mut [BrokenLink]) {
    links.sort_by(|a, b| {
        b.is_internal
            .cmp(&a.is_internal)
            .then_with(|| a.url.cmp(&b.url))
    });
}
