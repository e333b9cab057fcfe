//! Integration tests for the HTTP fetcher
//!
//! These tests use wiremock to create mock HTTP servers and check what a
//! single fetch extracts from real responses.

mod common;

use common::{serve_once, BARE_RESPONSE, TRUNCATED_RESPONSE};
use std::net::TcpListener;
use std::time::Duration;
use sumi_harvest::config::FetcherConfig;
use sumi_harvest::harvest::{HttpFetcher, SiteFetcher};
use sumi_harvest::FetchErrorKind;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(request_timeout_ms: u64) -> FetcherConfig {
    FetcherConfig {
        request_timeout_ms,
        max_concurrent_fetches: 4,
        user_agent: Some("HarvestTest/1.0".to_string()),
    }
}

fn create_fetcher() -> HttpFetcher {
    HttpFetcher::new(&create_test_config(2_000)).expect("Failed to build fetcher")
}

/// Returns a local port with nothing listening on it
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("No local address").port();
    drop(listener);
    port
}

#[tokio::test]
async fn test_fetch_extracts_headers_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("server", "wiremock-test")
                .set_body_raw("<html>hello</html>", "text/html; charset=utf-8"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/", mock_server.uri());
    let record = create_fetcher().fetch(&url).await.unwrap();

    let port = url::Url::parse(&mock_server.uri())
        .unwrap()
        .port()
        .expect("Mock server URI has a port");

    assert_eq!(record.source_url, url);
    assert_eq!(record.scheme, "http");
    assert_eq!(record.host, "127.0.0.1");
    assert_eq!(record.port, port);
    assert_eq!(record.server_header, "wiremock-test");
    assert!(record.content_type.starts_with("text/html"));
    assert!(record.content_type.contains("charset=utf-8"));
    assert_eq!(record.body, "<html>hello</html>");
}

#[tokio::test]
async fn test_missing_headers_use_defaults() {
    let url = serve_once(BARE_RESPONSE).await;
    let record = create_fetcher().fetch(&url).await.unwrap();

    assert_eq!(record.server_header, "");
    assert_eq!(record.content_type, "text/plain");
    assert_eq!(record.body, "raw bytes");
}

#[tokio::test]
async fn test_error_status_is_still_a_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&mock_server)
        .await;

    let url = format!("{}/missing", mock_server.uri());
    let record = create_fetcher().fetch(&url).await.unwrap();

    assert_eq!(record.body, "not here");
    assert!(!record.is_placeholder());
}

#[tokio::test]
async fn test_request_carries_agent_and_closes_connection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("user-agent", "HarvestTest/1.0"))
        .and(header("connection", "close"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let record = create_fetcher().fetch(&mock_server.uri()).await.unwrap();
    assert_eq!(record.body, "ok");
}

#[tokio::test]
async fn test_invalid_body_bytes_are_replaced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a', 0xff, b'b']))
        .mount(&mock_server)
        .await;

    let record = create_fetcher().fetch(&mock_server.uri()).await.unwrap();
    assert_eq!(record.body, "a\u{fffd}b");
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let fetcher = HttpFetcher::new(&create_test_config(200)).unwrap();
    let err = fetcher.fetch(&mock_server.uri()).await.unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::Network);
    assert_eq!(err.url(), mock_server.uri());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    let url = format!("http://127.0.0.1:{}/", closed_port());
    let err = create_fetcher().fetch(&url).await.unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::Network);
}

#[tokio::test]
async fn test_invalid_urls_fail_before_any_request() {
    let fetcher = create_fetcher();

    for url in ["not a url", "", "ftp://example.com/file", "http://"] {
        let err = fetcher.fetch(url).await.unwrap_err();
        assert_eq!(err.kind(), FetchErrorKind::InvalidUrl, "url: {:?}", url);
        assert_eq!(err.url(), url);
    }
}

#[tokio::test]
async fn test_truncated_body_is_body_read_error() {
    let url = serve_once(TRUNCATED_RESPONSE).await;
    let err = create_fetcher().fetch(&url).await.unwrap_err();

    assert_eq!(err.kind(), FetchErrorKind::BodyRead);
    assert_eq!(err.url(), url);
}
