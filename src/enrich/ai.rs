//! AI-generated insight text via an OpenAI-compatible chat completion API
//!
//! Request: `POST {base-url}/chat/completions` with `Authorization: Bearer <key>`.
//! The reply text is read from `choices[0].message.content`.

use crate::config::ProviderConfig;
use crate::enrich::{cancellable, ensure_success, EnrichError};
use crate::model::{AiInsightsResult, AnalysisResult};
use reqwest::Client;
use serde_json::{json, Value};
use std::fmt::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const PROVIDER: &str = "ai";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Fixed output contract for the insight provider
pub const AI_SYSTEM_PROMPT: &str = "You are a senior web performance and SEO consultant. \
Respond in Markdown only, with exactly two sections: `## Performance` and `## SEO`. \
Under each section list concrete, prioritised actions as checkbox bullets of the form `- [ ] action`. \
Do not add any introduction, conclusion or other sections.";

#[derive(Debug, Clone)]
pub struct AiInsightsEnricher {
    client: Client,
    config: ProviderConfig,
}

impl AiInsightsEnricher {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        Self { client, config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_configured()
    }

    fn model(&self) -> &str {
        self.config
            .model
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_MODEL)
    }

    /// Asks the provider for a checklist about `result`
    ///
    /// Blank replies are treated as no result.
    pub async fn generate(
        &self,
        result: &AnalysisResult,
        cancel: &CancellationToken,
    ) -> Option<AiInsightsResult> {
        let (key, base) = self.config.credentials()?;
        let endpoint = completions_endpoint(base);
        let model = self.model();

        let body = json!({
            "model": model,
            "temperature": 0.3,
            "messages": [
                {"role": "system", "content": AI_SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(result)}
            ]
        });

        let request = async {
            let response = self
                .client
                .post(&endpoint)
                .bearer_auth(key)
                .json(&body)
                .timeout(REQUEST_TIMEOUT)
                .send()
                .await?;
            let response = ensure_success(PROVIDER, response).await?;
            let reply: Value = response.json().await?;
            extract_text(&reply)
        };

        match cancellable(cancel, request).await {
            Ok(text) => Some(AiInsightsResult {
                text,
                model: Some(model.to_string()),
            }),
            Err(e) => {
                tracing::warn!("AI insights for {} failed: {}", result.url, e);
                None
            }
        }
    }
}

fn completions_endpoint(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else {
        format!("{}/chat/completions", base)
    }
}

fn extract_text(reply: &Value) -> Result<String, EnrichError> {
    let text = reply
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();

    if text.is_empty() {
        return Err(EnrichError::Parse {
            provider: PROVIDER,
            message: "empty completion".to_string(),
        });
    }
    Ok(text.to_string())
}

/// Summarises the analysis for the model
fn build_prompt(result: &AnalysisResult) -> String {
    let seo = &result.seo;
    let mut prompt = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(prompt, "Website: {}", result.url);
    let _ = writeln!(
        prompt,
        "Scores: overall {}/100, SEO {}/100, speed {}/100",
        result.score.overall, result.score.seo, result.score.speed
    );
    let _ = writeln!(
        prompt,
        "HTTP status: {}, server response time: {} ms",
        result.network.status_code, result.network.response_time_ms
    );
    let _ = writeln!(
        prompt,
        "Title: {} ({} chars); meta description: {} chars",
        seo.title.as_deref().unwrap_or("(missing)"),
        seo.title_length,
        seo.meta_description_length
    );
    let _ = writeln!(
        prompt,
        "H1: {}, H2: {}, images: {} ({} without alt), links: {} internal / {} external",
        seo.h1_count,
        seo.h2_count,
        seo.image_count,
        seo.images_without_alt,
        seo.internal_link_count,
        seo.external_link_count
    );
    let _ = writeln!(
        prompt,
        "Indexable: {}, HTTPS: {}, viewport: {}, canonical: {}",
        yes_no(seo.is_indexable),
        yes_no(seo.is_https),
        yes_no(seo.has_viewport),
        yes_no(seo.has_canonical())
    );
    let _ = writeln!(
        prompt,
        "Accessibility: lang attribute {}, skip link {}, {} landmarks, {} unlabeled form controls",
        yes_no(seo.has_language_attribute),
        yes_no(seo.has_skip_link),
        seo.landmark_count,
        seo.unlabeled_form_controls
    );
    let _ = writeln!(
        prompt,
        "Structured data blocks: {} ({}); Open Graph: {}, Twitter Card: {}",
        seo.structured_data_count,
        seo.structured_data_types.join(", "),
        yes_no(seo.has_open_graph),
        yes_no(seo.has_twitter_card)
    );
    let _ = writeln!(prompt, "Broken links in sample: {}", seo.broken_link_count);

    if let Some(channel) = result
        .performance
        .as_ref()
        .and_then(|p| p.primary_channel())
    {
        let _ = writeln!(
            prompt,
            "Lab metrics ({}): LCP {:?} ms, FCP {:?} ms, TBT {:?} ms, CLS {:?}",
            channel.strategy,
            channel.largest_contentful_paint_ms,
            channel.first_contentful_paint_ms,
            channel.total_blocking_time_ms,
            channel.cumulative_layout_shift
        );
    }

    prompt
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
