//! Analysis orchestrator - runs one analysis end to end
//!
//! The pipeline is linear with two fan-out points (probe with DOM render,
//! performance with off-page enrichment). Only URL validation, cancellation
//! and a requested history write can end an analysis early; every other
//! step degrades into absent data.

use crate::analysis::throttle::AnalysisThrottler;
use crate::config::Config;
use crate::enrich::{
    AiInsightsEnricher, DomRenderer, OffPageEnricher, PerformanceEnricher, RenderedPage,
};
use crate::fetch::{build_http_client, probe_url, LinkHealthChecker, ProbeOutcome};
use crate::history::{HistoryError, HistoryStore, JsonFileHistory, ScanRecord};
use crate::model::{AnalysisMode, AnalysisRequest, AnalysisResult};
use crate::score::calculate_scores;
use crate::seo::build_seo_result;
use crate::url::normalize_url;
use crate::AuditError;
use reqwest::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;

/// Runs analyses against shared clients, enrichers and history
///
/// One orchestrator is meant to be shared (behind an `Arc`) by every caller
/// in the process so that they all count against the same throttle.
pub struct AnalysisOrchestrator {
    client: Client,
    throttler: AnalysisThrottler,
    links: LinkHealthChecker,
    performance: PerformanceEnricher,
    off_page: OffPageEnricher,
    ai: AiInsightsEnricher,
    renderer: Option<Arc<dyn DomRenderer>>,
    history: Arc<dyn HistoryStore>,
    fast_timeout: Duration,
    deep_timeout: Duration,
}

impl AnalysisOrchestrator {
    /// Creates an orchestrator from configuration
    ///
    /// History goes to the JSON file named in `[history]`; no DOM renderer
    /// is attached, so deep mode falls back to static HTML until one is
    /// provided with [`with_renderer`](Self::with_renderer).
    ///
    /// # Errors
    ///
    /// Returns `AuditError::HttpClient` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, AuditError> {
        let client = build_http_client(&config.user_agent)?;
        let max_concurrent = usize::try_from(config.analysis.max_concurrent_scans).unwrap_or(1);

        Ok(Self {
            throttler: AnalysisThrottler::new(max_concurrent),
            links: LinkHealthChecker::new(client.clone()),
            performance: PerformanceEnricher::new(client.clone(), config.performance.clone()),
            off_page: OffPageEnricher::new(client.clone(), config.off_page.clone()),
            ai: AiInsightsEnricher::new(client.clone(), config.ai.clone()),
            renderer: None,
            history: Arc::new(JsonFileHistory::new(&config.history.path)),
            fast_timeout: Duration::from_secs(config.analysis.fast_timeout_secs),
            deep_timeout: Duration::from_secs(config.analysis.deep_timeout_secs),
            client,
        })
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn DomRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    /// Replaces the throttle, e.g. to share one across orchestrators
    pub fn with_throttler(mut self, throttler: AnalysisThrottler) -> Self {
        self.throttler = throttler;
        self
    }

    pub fn throttler(&self) -> &AnalysisThrottler {
        &self.throttler
    }

    pub fn history(&self) -> &Arc<dyn HistoryStore> {
        &self.history
    }

    fn fetch_timeout(&self, mode: AnalysisMode) -> Duration {
        match mode {
            AnalysisMode::Fast => self.fast_timeout,
            AnalysisMode::Deep => self.deep_timeout,
        }
    }

    /// Runs one analysis
    ///
    /// # Steps
    ///
    /// 1. Wait for a throttle slot (held until the analysis returns)
    /// 2. Normalize the URL; invalid input yields a zero-score result
    /// 3. Fetch the page, rendering it concurrently in deep mode
    /// 4. Extract SEO and accessibility signals
    /// 5. Check a sample of the discovered links
    /// 6. Enrich with performance and off-page data (mode dependent)
    /// 7. Score, then persist a history record when `save_history` is set
    /// 8. Attach AI insights
    ///
    /// # Errors
    ///
    /// * `AuditError::Cancelled` - `cancel` fired before the analysis finished
    /// * `AuditError::History` - the requested history write failed
    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        save_history: bool,
        cancel: &CancellationToken,
    ) -> Result<AnalysisResult, AuditError> {
        let _permit = self.throttler.acquire(cancel).await?;
        let started = Instant::now();
        let mode = request.mode;

        let url = match normalize_url(&request.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!("Rejected analysis input '{}': {}", request.url, e);
                return Ok(AnalysisResult::unreachable(request.url.trim(), e.to_string()));
            }
        };

        tracing::info!("Analyzing {} ({} mode)", url, mode);

        let (probe, rendered) = tokio::join!(
            probe_url(&self.client, &url, self.fetch_timeout(mode), cancel),
            self.render(&url, mode, cancel),
        );
        ensure_not_cancelled(cancel)?;

        let network = probe.network.clone();
        if let Some(error) = &network.error_message {
            tracing::info!("{} unreachable: {}", url, error);
        }

        let extraction = extract_seo(&url, &probe, rendered.as_ref());
        tracing::debug!(
            "Extracted {} links ({} internal) from {}",
            extraction.links.len(),
            extraction.seo.internal_link_count,
            url
        );

        let seo = match self
            .links
            .find_broken_links(&url, &extraction.links, mode, cancel)
            .await
        {
            Ok(broken) => extraction.seo.with_broken_links(broken),
            Err(AuditError::Cancelled) => return Err(AuditError::Cancelled),
            Err(e) => {
                tracing::warn!("Link health check for {} failed: {}", url, e);
                extraction.seo
            }
        };

        let (performance, off_page_seo) = tokio::join!(
            async {
                if mode.fetches_performance() && self.performance.is_enabled() {
                    self.performance.fetch(&url, cancel).await
                } else {
                    None
                }
            },
            async {
                if mode.fetches_off_page() && self.off_page.is_enabled() {
                    self.off_page.fetch(&url, cancel).await
                } else {
                    None
                }
            },
        );
        ensure_not_cancelled(cancel)?;

        let score = calculate_scores(&network, &seo, performance.as_ref());

        let result = AnalysisResult {
            url: url.to_string(),
            checked_at: network.checked_at,
            network,
            seo,
            score,
            performance,
            off_page_seo,
            ai_insights: None,
        };

        if save_history {
            self.save_record(ScanRecord::from_result(&result)).await?;
        }

        let ai_insights = if self.ai.is_enabled() {
            self.ai.generate(&result, cancel).await
        } else {
            None
        };
        ensure_not_cancelled(cancel)?;

        tracing::info!(
            "Analysis of {} finished in {:?}: overall {}, seo {}, speed {}",
            result.url,
            started.elapsed(),
            result.score.overall,
            result.score.seo,
            result.score.speed
        );

        Ok(result.with_ai_insights(ai_insights))
    }

    /// Renders the page in deep mode; any failure means "use static HTML"
    async fn render(
        &self,
        url: &Url,
        mode: AnalysisMode,
        cancel: &CancellationToken,
    ) -> Option<RenderedPage> {
        let renderer = self.renderer.as_ref().filter(|_| mode.renders_dom())?;
        match renderer.render(url, cancel).await {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!("DOM render of {} failed, using static HTML: {:#}", url, e);
                None
            }
        }
    }

    async fn save_record(&self, record: ScanRecord) -> Result<(), AuditError> {
        let history = Arc::clone(&self.history);
        tokio::task::spawn_blocking(move || history.add_record(record))
            .await
            .map_err(|e| HistoryError::Io(std::io::Error::other(e)))??;
        Ok(())
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), AuditError> {
    if cancel.is_cancelled() {
        Err(AuditError::Cancelled)
    } else {
        Ok(())
    }
}

/// Extracts SEO data, preferring the rendered DOM when it produced HTML
fn extract_seo(
    url: &Url,
    probe: &ProbeOutcome,
    rendered: Option<&RenderedPage>,
) -> crate::seo::SeoExtraction {
    let html = rendered
        .and_then(|page| page.html.as_deref())
        .filter(|html| !html.trim().is_empty())
        .unwrap_or(probe.html.as_str());

    build_seo_result(
        url,
        html,
        Some(&probe.headers),
        rendered.map(RenderedPage::counts),
    )
}
