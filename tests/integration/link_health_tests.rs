//! Integration tests for the link-health checker

use site_auditor::config::UserAgentConfig;
use site_auditor::fetch::{build_http_client, LinkHealthChecker};
use site_auditor::{AnalysisMode, AuditError};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn checker() -> LinkHealthChecker {
    LinkHealthChecker::new(build_http_client(&UserAgentConfig::default()).unwrap())
}

/// Answers 200 after `delay` and records when each request arrived
#[derive(Clone)]
struct ArrivalRecorder {
    delay: Duration,
    arrivals: Arc<Mutex<Vec<Instant>>>,
}

impl ArrivalRecorder {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            arrivals: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Largest number of requests that arrived within half a response
    /// delay of each other, i.e. were in flight together
    fn peak_in_flight(&self) -> usize {
        let mut arrivals = self.arrivals.lock().unwrap().clone();
        arrivals.sort();
        let window = self.delay / 2;
        (0..arrivals.len())
            .map(|i| {
                arrivals[i..]
                    .iter()
                    .take_while(|t| t.duration_since(arrivals[i]) < window)
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    fn count(&self) -> usize {
        self.arrivals.lock().unwrap().len()
    }
}

impl Respond for ArrivalRecorder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.arrivals.lock().unwrap().push(Instant::now());
        ResponseTemplate::new(200).set_delay(self.delay)
    }
}

async fn assert_concurrency_ceiling(mode: AnalysisMode, link_count: usize) {
    let server = MockServer::start().await;
    let delay = Duration::from_millis(400);
    let recorder = ArrivalRecorder::new(delay);
    Mock::given(method("HEAD"))
        .respond_with(recorder.clone())
        .mount(&server)
        .await;

    let site = Url::parse(&server.uri()).unwrap();
    let links: Vec<String> = (0..link_count)
        .map(|i| format!("{}/slow-{}", server.uri(), i))
        .collect();

    let started = Instant::now();
    let broken = checker()
        .find_broken_links(&site, &links, mode, &CancellationToken::new())
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(broken.is_empty());
    assert_eq!(recorder.count(), link_count);

    let ceiling = mode.link_concurrency();
    assert_eq!(recorder.peak_in_flight(), ceiling);

    // Checks run in waves of at most `ceiling`
    let waves = link_count.div_ceil(ceiling) as u32;
    assert!(elapsed >= delay * waves, "finished in {:?}", elapsed);
}

#[tokio::test]
async fn test_empty_and_healthy_links() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let site = Url::parse(&server.uri()).unwrap();
    let cancel = CancellationToken::new();

    let none = checker()
        .find_broken_links(&site, &[], AnalysisMode::Fast, &cancel)
        .await
        .unwrap();
    assert!(none.is_empty());

    let links: Vec<String> = (0..5).map(|i| format!("{}/ok-{}", server.uri(), i)).collect();
    let healthy = checker()
        .find_broken_links(&site, &links, AnalysisMode::Fast, &cancel)
        .await
        .unwrap();
    assert!(healthy.is_empty());
}

#[tokio::test]
async fn test_head_not_allowed_falls_back_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/get-only"))
        .respond_with(ResponseTemplate::new(405))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/get-only"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let site = Url::parse(&server.uri()).unwrap();
    let links = vec![format!("{}/get-only", server.uri())];

    let broken = checker()
        .find_broken_links(&site, &links, AnalysisMode::Fast, &CancellationToken::new())
        .await
        .unwrap();
    assert!(broken.is_empty());
}

#[tokio::test]
async fn test_broken_links_are_reported_and_ordered() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/error"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/fine"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let site = Url::parse(&server.uri()).unwrap();
    let links = vec![
        format!("{}/gone", server.uri()),
        format!("{}/fine", server.uri()),
        format!("{}/error", server.uri()),
        // nothing listens on port 1
        "http://127.0.0.1:1/refused".to_string(),
    ];

    let broken = checker()
        .find_broken_links(&site, &links, AnalysisMode::Deep, &CancellationToken::new())
        .await
        .unwrap();

    let urls: Vec<&str> = broken.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "http://127.0.0.1:1/refused",
            format!("{}/error", server.uri()).as_str(),
            format!("{}/gone", server.uri()).as_str(),
        ]
    );
    assert!(broken.iter().all(|l| l.is_internal));

    assert_eq!(broken[0].status_code, 0);
    assert!(broken[0].reason.is_some());
    assert_eq!(broken[1].status_code, 500);
    assert_eq!(broken[2].status_code, 404);
    assert_eq!(broken[2].reason.as_deref(), Some("Not Found"));
}

#[tokio::test]
async fn test_duplicate_links_checked_once() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let site = Url::parse(&server.uri()).unwrap();
    let link = format!("{}/page", server.uri());
    let links = vec![link.clone(), link.clone(), link.to_uppercase().replace("HTTP://", "http://")];

    let broken = checker()
        .find_broken_links(&site, &links, AnalysisMode::Fast, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(broken.len(), 1);
}

#[tokio::test]
async fn test_cancellation_stops_checks() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let site = Url::parse(&server.uri()).unwrap();
    let links: Vec<String> = (0..4).map(|i| format!("{}/slow-{}", server.uri(), i)).collect();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = checker()
        .find_broken_links(&site, &links, AnalysisMode::Deep, &cancel)
        .await;
    assert!(matches!(result, Err(AuditError::Cancelled)));
}

#[tokio::test]
async fn test_fast_mode_runs_two_checks_at_a_time() {
    assert_concurrency_ceiling(AnalysisMode::Fast, 8).await;
}

#[tokio::test]
async fn test_deep_mode_runs_five_checks_at_a_time() {
    assert_concurrency_ceiling(AnalysisMode::Deep, 12).await;
}

#[tokio::test]
async fn test_slow_link_times_out_without_blocking_siblings() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/hangs"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/fine"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let site = Url::parse(&server.uri()).unwrap();
    let links = vec![
        format!("{}/hangs", server.uri()),
        format!("{}/gone", server.uri()),
        format!("{}/fine", server.uri()),
    ];

    let started = Instant::now();
    let broken = checker()
        .find_broken_links(&site, &links, AnalysisMode::Fast, &CancellationToken::new())
        .await
        .unwrap();

    // bounded by the per-link timeout, not the hanging response
    assert!(started.elapsed() < Duration::from_secs(15));

    let gone = format!("{}/gone", server.uri());
    let hangs = format!("{}/hangs", server.uri());
    let urls: Vec<&str> = broken.iter().map(|l| l.url.as_str()).collect();
    assert_eq!(urls, vec![gone.as_str(), hangs.as_str()]);
    assert_eq!(broken[0].status_code, 404);
    assert_eq!(broken[1].status_code, 0);
    assert!(broken[1].reason.is_some());
}
