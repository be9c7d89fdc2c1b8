//! Integration tests for the background scan queue

use site_auditor::config::{Config, QueueConfig};
use site_auditor::{AnalysisOrchestrator, AnalysisRequest, ScanJobState, ScanJobStatus, ScanQueue};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<html lang="en"><head><title>Queue test page</title></head>
<body><main><h1>Hello</h1><a href="/about">About</a></main></body></html>"#;

async fn start_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

fn orchestrator(dir: &TempDir) -> Arc<AnalysisOrchestrator> {
    let mut config = Config::default();
    config.history.path = dir.path().join("history.json").to_string_lossy().into_owned();
    config.analysis.fast_timeout_secs = 5;
    Arc::new(AnalysisOrchestrator::new(&config).unwrap())
}

async fn wait_for_terminal(queue: &ScanQueue, id: &str) -> ScanJobStatus {
    for _ in 0..500 {
        if let Some(status) = queue.status(id) {
            if status.state.is_terminal() {
                return status;
            }
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("job {} did not finish", id);
}

#[tokio::test]
async fn test_enqueue_then_complete_matches_synchronous_run() {
    let site = start_site().await;
    let dir = TempDir::new().unwrap();
    let orchestrator = orchestrator(&dir);
    let (queue, _worker) = ScanQueue::start(Arc::clone(&orchestrator), &QueueConfig::default());

    let request = AnalysisRequest::fast(site.uri());
    let id = queue.enqueue(request.clone(), false).unwrap();

    let immediate = queue.status(&id).expect("status right after enqueue");
    assert!(matches!(
        immediate.state,
        ScanJobState::Pending | ScanJobState::Processing
    ));
    assert!(immediate.result.is_none());

    let finished = wait_for_terminal(&queue, &id).await;
    assert_eq!(finished.state, ScanJobState::Completed);
    assert!(finished.error.is_none());
    let queued = finished.result.expect("completed job carries a result");

    let direct = orchestrator
        .analyze(&request, false, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(queued.url, direct.url);
    assert_eq!(queued.network.status_code, direct.network.status_code);
    assert_eq!(queued.seo, direct.seo);
    assert_eq!(queued.score.seo, direct.score.seo);
}

#[tokio::test]
async fn test_jobs_run_in_enqueue_order() {
    let site = start_site().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/page-\d+$"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PAGE)
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&site)
        .await;

    let dir = TempDir::new().unwrap();
    let (queue, _worker) = ScanQueue::start(orchestrator(&dir), &QueueConfig::default());

    let ids: Vec<String> = (0..3)
        .map(|i| {
            let url = format!("{}/page-{}", site.uri(), i);
            queue.enqueue(AnalysisRequest::fast(url), false).unwrap()
        })
        .collect();

    let mut finished = Vec::new();
    for id in &ids {
        finished.push(wait_for_terminal(&queue, id).await);
    }
    assert!(finished.iter().all(|s| s.state == ScanJobState::Completed));
    for pair in finished.windows(2) {
        assert!(pair[0].updated_at <= pair[1].updated_at);
    }

    // Each job's last request (the link check) lands before the next job's
    // page fetch, so no two jobs overlapped.
    let requests: Vec<String> = site
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| format!("{} {}", r.method, r.url.path()))
        .collect();
    assert_eq!(
        requests,
        vec![
            "GET /page-0",
            "HEAD /about",
            "GET /page-1",
            "HEAD /about",
            "GET /page-2",
            "HEAD /about",
        ]
    );
    assert_eq!(queue.pending_jobs(), 0);
}

#[tokio::test]
async fn test_failed_job_records_error() {
    let site = start_site().await;
    let dir = TempDir::new().unwrap();

    // A directory where the history file should be makes the write fail.
    let blocked = dir.path().join("history.json");
    std::fs::create_dir(&blocked).unwrap();
    let mut config = Config::default();
    config.history.path = blocked.to_string_lossy().into_owned();
    let orchestrator = Arc::new(AnalysisOrchestrator::new(&config).unwrap());
    let (queue, _worker) = ScanQueue::start(orchestrator, &QueueConfig::default());

    let id = queue.enqueue(AnalysisRequest::fast(site.uri()), true).unwrap();
    let status = wait_for_terminal(&queue, &id).await;

    assert_eq!(status.state, ScanJobState::Failed);
    assert!(status.result.is_none());
    assert!(status.error.as_deref().is_some_and(|e| e.contains("History error")));
}

#[tokio::test]
async fn test_status_of_unknown_job() {
    let dir = TempDir::new().unwrap();
    let (queue, _worker) = ScanQueue::start(orchestrator(&dir), &QueueConfig::default());
    assert!(queue.status("00000000-0000-0000-0000-000000000000").is_none());
}
