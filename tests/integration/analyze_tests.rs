//! Integration tests for the analyzer
//!
//! These tests use wiremock to create mock HTTP servers and drive the full
//! validate, probe and extract cycle through the real HTTP client.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use page_analyzer::analyzer::{build_http_client, HttpFetcher, RetryPolicy};
use page_analyzer::config::{FetchConfig, UserAgentConfig};
use page_analyzer::server::router;
use page_analyzer::{Analyzer, ErrorKind};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates an analyzer with a short request timeout and no retry delay
fn create_test_analyzer(max_attempts: u32) -> Analyzer {
    let fetch = FetchConfig {
        request_timeout_secs: 1,
        connect_timeout_secs: 1,
        analysis_timeout_secs: 0,
    };
    let client = build_http_client(&UserAgentConfig::default(), &fetch)
        .expect("Failed to build client");

    Analyzer::new(
        Arc::new(HttpFetcher::new(client)),
        RetryPolicy::new(max_attempts, Duration::ZERO),
    )
}

async fn mount_page(mock_server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(status)
                .set_body_string(body.to_string())
                .insert_header("content-type", "text/html"),
        )
        .mount(mock_server)
        .await;
}

/// Returns a URL on a port nothing is listening on
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to read address");
    drop(listener);
    format!("http://{}/", addr)
}

#[tokio::test]
async fn test_full_analysis() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        200,
        r##"<!DOCTYPE html>
        <html>
        <head><title>Scrape Title</title></head>
        <body>
            <h1>Header</h1>
            <h2>Sub 1</h2>
            <h2>Sub 2</h2>
            <a href="/about">About</a>
            <a href="https://other.com/">Other</a>
            <a href="mailto:team@example.com">Mail</a>
            <a href="#">Top</a>
            <form action="/login" method="post"></form>
        </body>
        </html>"##,
    )
    .await;

    let analyzer = create_test_analyzer(3);
    let report = analyzer
        .analyze(&mock_server.uri())
        .await
        .expect("Analysis failed");

    assert_eq!(report.url, format!("{}/", mock_server.uri()));
    assert_eq!(report.html_version, "html");
    assert_eq!(report.title, "Scrape Title");
    assert_eq!(report.heading_count("h1"), 1);
    assert_eq!(report.heading_count("h2"), 2);
    assert_eq!(report.heading_count("h3"), 0);
    assert_eq!(report.accessible_link_count, 2);
    assert_eq!(report.inaccessible_link_count, 1);
    assert!(report.has_login_form);

    // One reachability probe plus one content fetch
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_mock_title() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/page",
        200,
        "<html><head><title>Mock Title</title></head></html>",
    )
    .await;

    let analyzer = create_test_analyzer(3);
    let report = analyzer
        .analyze(&format!("{}/page", mock_server.uri()))
        .await
        .expect("Analysis failed");

    assert_eq!(report.title, "Mock Title");
    assert!(!report.has_login_form);
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", 403, "blocked").await;

    let analyzer = create_test_analyzer(3);
    let err = analyzer.analyze(&mock_server.uri()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Forbidden);
    assert_eq!(err.http_status, Some(403));
    assert!(err.message.contains("403"));

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_not_found_and_server_error() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/missing", 404, "").await;
    mount_page(&mock_server, "/broken", 500, "").await;

    let analyzer = create_test_analyzer(3);

    let err = analyzer
        .analyze(&format!("{}/missing", mock_server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
    assert!(err.message.contains("not found"));

    let err = analyzer
        .analyze(&format!("{}/broken", mock_server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::RemoteServerError);
    assert!(err.message.contains("server error"));
}

#[tokio::test]
async fn test_unrecognized_status() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", 418, "").await;

    let analyzer = create_test_analyzer(3);
    let err = analyzer.analyze(&mock_server.uri()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::UnclassifiedHttpError);
    assert!(err.message.contains("418"));
}

#[tokio::test]
async fn test_unreachable_target() {
    let analyzer = create_test_analyzer(3);
    let err = analyzer.analyze(&closed_port_url()).await.unwrap_err();

    assert_eq!(err.kind, ErrorKind::Unreachable);
    assert_eq!(err.http_status, None);
    assert!(err.message.contains("after 3 attempts"));
}

#[tokio::test]
async fn test_recovers_after_timeout() {
    let mock_server = MockServer::start().await;

    // First attempt outlives the 1s request timeout
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><head><title>Slow</title></head></html>")
                .set_delay(Duration::from_secs(3)),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    mount_page(
        &mock_server,
        "/",
        200,
        "<html><head><title>Fast</title></head></html>",
    )
    .await;

    let analyzer = create_test_analyzer(3);
    let report = analyzer
        .analyze(&mock_server.uri())
        .await
        .expect("Analysis failed");

    assert_eq!(report.title, "Fast");

    // Timed-out probe, successful probe, content fetch
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_router_end_to_end() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "/", 403, "").await;

    let app = router(create_test_analyzer(3));
    let uri = format!("/analyze?url={}", mock_server.uri());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["kind"], "forbidden");
}

#[tokio::test]
async fn test_concurrent_analyses_are_independent() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/one",
        200,
        "<html><head><title>One</title></head><body><h1>a</h1></body></html>",
    )
    .await;
    mount_page(
        &mock_server,
        "/two",
        200,
        "<html><head><title>Two</title></head><body><h2>b</h2><h2>c</h2></body></html>",
    )
    .await;

    let analyzer = create_test_analyzer(3);
    let one_url = format!("{}/one", mock_server.uri());
    let two_url = format!("{}/two", mock_server.uri());

    let (one, two) = tokio::join!(analyzer.analyze(&one_url), analyzer.analyze(&two_url));
    let (one, two) = (one.unwrap(), two.unwrap());

    assert_eq!(one.title, "One");
    assert_eq!(one.heading_count("h1"), 1);
    assert_eq!(one.heading_count("h2"), 0);
    assert_eq!(two.title, "Two");
    assert_eq!(two.heading_count("h1"), 0);
    assert_eq!(two.heading_count("h2"), 2);
}
