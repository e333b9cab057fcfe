//! Integration tests for the batch coordinator
//!
//! Stub fetchers check ordering and the concurrency cap without a network;
//! wiremock servers check full batches over HTTP.

mod common;

use async_trait::async_trait;
use common::{serve_once, TRUNCATED_RESPONSE};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sumi_harvest::config::FetcherConfig;
use sumi_harvest::harvest::{Coordinator, SiteFetcher};
use sumi_harvest::site::SiteRecord;
use sumi_harvest::url::parse_target;
use sumi_harvest::{FetchError, FetchErrorKind};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds records from the URL alone, answering later URLs sooner
struct StubFetcher;

#[async_trait]
impl SiteFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<SiteRecord, FetchError> {
        let target = parse_target(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        // Reverse completion order relative to input order
        let delay = 40u64.saturating_sub(target.url.path().len() as u64 * 5);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        Ok(SiteRecord {
            source_url: url.to_string(),
            scheme: target.scheme,
            host: target.host,
            port: target.port,
            server_header: "stub".to_string(),
            content_type: "text/html".to_string(),
            body: format!("<p>{}</p>", url),
        })
    }
}

/// Counts fetches in flight and remembers the highest count seen
#[derive(Default)]
struct CountingFetcher {
    active: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl SiteFetcher for CountingFetcher {
    async fn fetch(&self, url: &str) -> Result<SiteRecord, FetchError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(5)).await;

        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(SiteRecord {
            source_url: url.to_string(),
            body: "counted".to_string(),
            ..SiteRecord::placeholder(url)
        })
    }
}

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|u| u.to_string()).collect()
}

#[tokio::test]
async fn test_mixed_batch_keeps_positions() {
    let coordinator = Coordinator::new(Arc::new(StubFetcher), 50);
    let input = urls(&[
        "https://example.com",
        "not-a-url",
        "https://example.com:8443/path",
    ]);

    let report = coordinator.run(&input).await;
    let records = &report.records;

    assert_eq!(records.len(), 3);

    assert_eq!(records[0].source_url, "https://example.com");
    assert_eq!(records[0].scheme, "https");
    assert_eq!(records[0].host, "example.com");
    assert_eq!(records[0].port, 443);

    assert_eq!(records[1], SiteRecord::placeholder("not-a-url"));
    assert_eq!(records[1].port, 80);
    assert_eq!(records[1].content_type, "text/plain");

    assert_eq!(records[2].source_url, "https://example.com:8443/path");
    assert_eq!(records[2].port, 8443);

    assert_eq!(report.stats.succeeded, 2);
    assert_eq!(
        report.stats.failures.get(&FetchErrorKind::InvalidUrl),
        Some(&1)
    );
}

#[tokio::test]
async fn test_duplicates_keep_their_own_slots() {
    let coordinator = Coordinator::new(Arc::new(StubFetcher), 3);
    let input = urls(&[
        "https://example.com/a",
        "https://example.com/longer/path",
        "https://example.com/a",
        "bad url",
        "https://example.com/a",
    ]);

    let report = coordinator.run(&input).await;

    assert_eq!(report.records.len(), input.len());
    for (record, url) in report.records.iter().zip(&input) {
        assert_eq!(&record.source_url, url);
    }
    assert_eq!(report.records[0], report.records[2]);
    assert_eq!(report.records[2], report.records[4]);
    assert!(report.records[3].is_placeholder());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrency_cap_is_never_exceeded() {
    const CAP: usize = 5;

    let fetcher = Arc::new(CountingFetcher::default());
    let coordinator = Coordinator::new(fetcher.clone(), CAP);
    let input: Vec<String> = (0..120).map(|i| format!("https://site{}.example.com/", i)).collect();

    let report = coordinator.run(&input).await;

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 120);
    assert!(fetcher.peak.load(Ordering::SeqCst) <= CAP);
    assert_eq!(fetcher.active.load(Ordering::SeqCst), 0);

    assert_eq!(report.records.len(), 120);
    assert_eq!(report.stats.succeeded, 120);
    assert!(report.stats.peak_in_flight <= CAP);
    assert!(report.stats.admission_waits > 0);
    for (index, record) in report.records.iter().enumerate() {
        assert_eq!(record.source_url, input[index]);
        assert_eq!(record.body, "counted");
    }
}

#[tokio::test]
async fn test_cap_of_one_runs_sequentially() {
    let fetcher = Arc::new(CountingFetcher::default());
    let coordinator = Coordinator::new(fetcher.clone(), 1);
    let input: Vec<String> = (0..10).map(|i| format!("https://s{}.example.com", i)).collect();

    let report = coordinator.run(&input).await;

    assert_eq!(fetcher.peak.load(Ordering::SeqCst), 1);
    assert_eq!(report.stats.peak_in_flight, 1);
    assert_eq!(report.stats.succeeded, 10);
}

#[tokio::test]
async fn test_http_batch_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("server", "mock-server")
                .set_body_raw("<html>home</html>", "text/html"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410).set_body_string("gone"))
        .mount(&mock_server)
        .await;

    let refused_port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let base = mock_server.uri();
    let input = vec![
        format!("{}/home", base),
        "definitely not a url".to_string(),
        format!("http://127.0.0.1:{}/", refused_port),
        format!("{}/gone", base),
        format!("{}/home", base),
    ];

    let config = FetcherConfig {
        request_timeout_ms: 2_000,
        max_concurrent_fetches: 2,
        user_agent: None,
    };
    let coordinator = Coordinator::from_config(&config).unwrap();
    let report = coordinator.run(&input).await;
    let records = &report.records;

    assert_eq!(records.len(), 5);

    assert_eq!(records[0].server_header, "mock-server");
    assert!(records[0].content_type.starts_with("text/html"));
    assert_eq!(records[0].body, "<html>home</html>");
    assert_eq!(records[0].host, "127.0.0.1");

    assert_eq!(records[1], SiteRecord::placeholder("definitely not a url"));
    assert_eq!(records[2], SiteRecord::placeholder(&input[2]));

    assert_eq!(records[3].body, "gone");
    assert_eq!(records[4], records[0]);

    assert_eq!(report.stats.succeeded, 3);
    assert_eq!(
        report.stats.failures.get(&FetchErrorKind::InvalidUrl),
        Some(&1)
    );
    assert_eq!(
        report.stats.failures.get(&FetchErrorKind::Network),
        Some(&1)
    );
    assert_eq!(report.stats.max_concurrent_fetches, 2);
    assert!(report.stats.peak_in_flight <= 2);
}

#[tokio::test]
async fn test_scrape_all_of_unreachable_input() {
    let input = urls(&["", "mailto:someone@example.com", "http://[::1"]);

    let records = sumi_harvest::scrape_all(&input).await.unwrap();

    assert_eq!(records.len(), 3);
    for (record, url) in records.iter().zip(&input) {
        assert_eq!(record, &SiteRecord::placeholder(url));
    }
}

#[tokio::test]
async fn test_truncated_body_becomes_placeholder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("complete"))
        .mount(&mock_server)
        .await;

    let input = vec![serve_once(TRUNCATED_RESPONSE).await, mock_server.uri()];

    let coordinator = Coordinator::from_config(&FetcherConfig::default()).unwrap();
    let report = coordinator.run(&input).await;

    assert_eq!(report.records[0], SiteRecord::placeholder(&input[0]));
    assert_eq!(report.records[1].body, "complete");
    assert_eq!(report.stats.succeeded, 1);
    assert_eq!(
        report.stats.failures.get(&FetchErrorKind::BodyRead),
        Some(&1)
    );
}
