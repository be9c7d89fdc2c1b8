//! Integration tests for the analysis pipeline
//!
//! These tests use wiremock to stand in for the audited site and for the
//! performance, off-page and AI providers.

use serde_json::json;
use site_auditor::config::{Config, ProviderConfig};
use site_auditor::history::{HistoryStore, JsonFileHistory};
use site_auditor::recommend::{build_recommendations, RecommendationCategory};
use site_auditor::{AnalysisOrchestrator, AnalysisRequest};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Acme Widgets - Handmade widgets since 1990</title>
  <meta name="description" content="Acme builds durable handmade widgets for workshops, schools and hobbyists, shipped worldwide within two days.">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <link rel="canonical" href="/">
  <meta property="og:title" content="Acme Widgets">
  <meta name="twitter:card" content="summary">
  <script type="application/ld+json">{"@context": "https://schema.org", "@type": "Organization", "name": "Acme"}</script>
</head>
<body>
  <a href="#main">Skip to content</a>
  <header><nav><a href="/ok">Products</a> <a href="/missing">Old page</a> <a href="/no-head">About</a></nav></header>
  <main id="main">
    <h1>Acme Widgets</h1>
    <h2>Catalogue</h2>
    <img src="/a.png" alt="A widget">
    <img src="/b.png">
    <form><label for="email">Email</label><input id="email" type="email"><input type="text" name="unlabeled"></form>
  </main>
  <footer>Acme</footer>
</body>
</html>"##;

fn lighthouse_body() -> serde_json::Value {
    json!({
        "lighthouseResult": {
            "categories": {"performance": {"score": 0.82}},
            "audits": {
                "largest-contentful-paint": {"numericValue": 2100.0},
                "first-contentful-paint": {"numericValue": 1200.0},
                "total-blocking-time": {"numericValue": 150.0},
                "cumulative-layout-shift": {"numericValue": 0.05},
                "render-blocking-resources": {
                    "title": "Eliminate render-blocking resources",
                    "score": 0.4,
                    "details": {"type": "opportunity", "overallSavingsMs": 640.0}
                }
            }
        }
    })
}

async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    Mock::given(method("HEAD"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(405))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/no-head"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn test_config(history_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.history.path = history_dir
        .path()
        .join("history.json")
        .to_string_lossy()
        .into_owned();
    config.analysis.fast_timeout_secs = 2;
    config.analysis.deep_timeout_secs = 2;
    config
}

fn provider(base_url: String) -> ProviderConfig {
    ProviderConfig {
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_timeout_yields_unreachable_result() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.analysis.fast_timeout_secs = 1;
    let orchestrator = AnalysisOrchestrator::new(&config).unwrap();

    let result = orchestrator
        .analyze(&AnalysisRequest::fast(site.uri()), false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.network.status_code, 0);
    assert!(result.network.error_message.is_some());
    assert_eq!(result.score.speed, 0);

    let recommendations = build_recommendations(&result);
    let first = &recommendations[0];
    assert_eq!(first.category, RecommendationCategory::Network);
    assert!(first.title.to_lowercase().contains("unreachable"));
}

#[tokio::test]
async fn test_fast_analysis_of_full_page() {
    let site = MockServer::start().await;
    mount_site(&site).await;

    let dir = TempDir::new().unwrap();
    let orchestrator = AnalysisOrchestrator::new(&test_config(&dir)).unwrap();

    let result = orchestrator
        .analyze(&AnalysisRequest::fast(site.uri()), false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.network.status_code, 200);
    let seo = &result.seo;
    assert_eq!(seo.title.as_deref(), Some("Acme Widgets - Handmade widgets since 1990"));
    assert_eq!(seo.h1_count, 1);
    assert_eq!(seo.h2_count, 1);
    assert_eq!(seo.structured_data_count, 1);
    assert_eq!(seo.structured_data_types, vec!["Organization".to_string()]);
    assert!(seo.has_language_attribute);
    assert!(seo.has_skip_link);
    assert_eq!(seo.landmark_count, 4);
    assert_eq!(seo.image_count, 2);
    assert_eq!(seo.images_without_alt, 1);
    assert_eq!(seo.unlabeled_form_controls, 1);
    assert!(seo.has_open_graph);
    assert!(seo.has_twitter_card);
    assert!(seo.is_indexable);
    assert!(!seo.is_https);

    // only /missing is broken; /no-head recovers through GET
    assert_eq!(seo.broken_link_count, 1);
    assert!(seo.broken_links[0].url.ends_with("/missing"));
    assert_eq!(seo.broken_links[0].status_code, 404);
    assert!(seo.broken_links[0].is_internal);

    // fast mode never calls the performance or off-page providers
    assert!(result.performance.is_none());
    assert!(result.off_page_seo.is_none());
    assert!(result.ai_insights.is_none());

    assert!(result.score.seo > 0 && result.score.seo <= 100);
    assert!(result.score.speed > 0);
}

#[tokio::test]
async fn test_deep_analysis_with_providers() {
    let site = MockServer::start().await;
    mount_site(&site).await;

    let providers = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/perf"))
        .and(query_param("key", "test-key"))
        .and(query_param("category", "performance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse_body()))
        .mount(&providers)
        .await;

    Mock::given(method("GET"))
        .and(path("/off-page"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"domain_authority": 42, "backlinks": "1500", "referring_domains": 80}
        })))
        .mount(&providers)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "## Performance\n- [ ] Inline critical CSS\n\n## SEO\n- [ ] Label every form field\n"}}]
        })))
        .mount(&providers)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.performance = provider(format!("{}/perf", providers.uri()));
    config.off_page = provider(format!("{}/off-page", providers.uri()));
    config.ai = provider(format!("{}/v1", providers.uri()));
    let orchestrator = AnalysisOrchestrator::new(&config).unwrap();

    let result = orchestrator
        .analyze(&AnalysisRequest::deep(site.uri()), false, &CancellationToken::new())
        .await
        .unwrap();

    let performance = result.performance.as_ref().expect("performance data");
    let mobile = performance.mobile.as_ref().expect("mobile channel");
    assert_eq!(mobile.score, Some(82));
    assert_eq!(mobile.largest_contentful_paint_ms, Some(2100.0));
    assert!(performance.desktop.is_some());
    assert_eq!(
        performance.top_suggestion().map(|s| s.title.as_str()),
        Some("Eliminate render-blocking resources")
    );

    let off_page = result.off_page_seo.as_ref().expect("off-page data");
    assert_eq!(off_page.domain_authority, Some(42.0));
    assert_eq!(off_page.backlinks, Some(1500));
    assert_eq!(off_page.referring_domains, Some(80));

    let insights = result.ai_insights.as_ref().expect("ai insights");
    let sections = insights.checklist();
    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].title, "Performance");
    assert_eq!(sections[1].items, vec!["Label every form field".to_string()]);

    // all lab metrics are in the "good" range
    assert_eq!(result.score.speed, 100);

    let recommendations = build_recommendations(&result);
    assert!(recommendations
        .iter()
        .any(|r| r.title == "Eliminate render-blocking resources"));
}

#[tokio::test]
async fn test_provider_outage_does_not_fail_analysis() {
    let site = MockServer::start().await;
    mount_site(&site).await;

    let providers = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .mount(&providers)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&providers)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.performance = provider(format!("{}/perf", providers.uri()));
    config.off_page = provider(format!("{}/off-page", providers.uri()));
    config.ai = provider(providers.uri());
    let orchestrator = AnalysisOrchestrator::new(&config).unwrap();

    let result = orchestrator
        .analyze(&AnalysisRequest::deep(site.uri()), false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(result.network.status_code, 200);
    assert!(result.performance.is_none());
    assert!(result.off_page_seo.is_none());
    assert!(result.ai_insights.is_none());
}

#[tokio::test]
async fn test_fast_mode_checks_at_most_ten_links() {
    let site = MockServer::start().await;
    let anchors: String = (0..25)
        .map(|i| format!(r#"<a href="/page-{}">Page {}</a>"#, i, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<html><body>{}</body></html>", anchors)),
        )
        .mount(&site)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let orchestrator = AnalysisOrchestrator::new(&test_config(&dir)).unwrap();

    let result = orchestrator
        .analyze(&AnalysisRequest::fast(site.uri()), false, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(result.seo.internal_link_count, 25);
    assert_eq!(result.seo.broken_link_count, 0);

    let requests = site.received_requests().await.unwrap();
    let link_checks = requests
        .iter()
        .filter(|r| r.method.to_string().eq_ignore_ascii_case("HEAD"))
        .count();
    assert_eq!(link_checks, 10);
}

#[tokio::test]
async fn test_noindex_header_marks_page_not_indexable() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Private</title></head><body></body></html>")
                .insert_header("x-robots-tag", "noindex"),
        )
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let orchestrator = AnalysisOrchestrator::new(&test_config(&dir)).unwrap();

    let result = orchestrator
        .analyze(&AnalysisRequest::fast(site.uri()), false, &CancellationToken::new())
        .await
        .unwrap();

    assert!(!result.seo.is_indexable);
    let recommendations = build_recommendations(&result);
    assert!(recommendations.iter().any(|r| r.title == "Page is not indexable"));
}

#[tokio::test]
async fn test_history_round_trip() {
    let site = MockServer::start().await;
    mount_site(&site).await;

    let dir = TempDir::new().unwrap();
    let history_path = dir.path().join("history.json");
    let history = Arc::new(JsonFileHistory::new(&history_path));
    let orchestrator = AnalysisOrchestrator::new(&test_config(&dir))
        .unwrap()
        .with_history(history.clone());
    let cancel = CancellationToken::new();

    let first = orchestrator
        .analyze(&AnalysisRequest::fast(site.uri()), true, &cancel)
        .await
        .unwrap();
    let second = orchestrator
        .analyze(&AnalysisRequest::fast(site.uri()), true, &cancel)
        .await
        .unwrap();

    let records = history.get_history(&site.uri()).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].checked_at, second.checked_at);
    assert_eq!(records[1].checked_at, first.checked_at);
    assert_eq!(records[0].overall_score, second.score.overall);
    assert_eq!(records[0].broken_link_count, 1);

    assert!(history_path.exists());
    let latest = history.get_latest(&site.uri()).unwrap().unwrap();
    assert_eq!(latest, records[0]);
}

#[tokio::test]
async fn test_history_not_written_unless_requested() {
    let site = MockServer::start().await;
    mount_site(&site).await;

    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let orchestrator = AnalysisOrchestrator::new(&config).unwrap();

    orchestrator
        .analyze(&AnalysisRequest::fast(site.uri()), false, &CancellationToken::new())
        .await
        .unwrap();

    assert!(!std::path::Path::new(&config.history.path).exists());
    assert!(orchestrator.history().get_history(&site.uri()).unwrap().is_empty());
}

#[tokio::test]
async fn test_cancellation_during_fetch() {
    let site = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = test_config(&dir);
    config.analysis.fast_timeout_secs = 30;
    let orchestrator = AnalysisOrchestrator::new(&config).unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let result = orchestrator
        .analyze(&AnalysisRequest::fast(site.uri()), false, &cancel)
        .await;

    assert!(matches!(result, Err(site_auditor::AuditError::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(3));
}
