#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "panics are the assertion mechanism in tests")]

use serde_json::json;
use std::time::Duration;
use wingrox_client::{default_targets, HealthProbe, ProbeStatus};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn refused_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn probe() -> HealthProbe {
    HealthProbe::new(Duration::from_millis(500)).expect("probe")
}

#[tokio::test]
async fn test_fully_down_backend_is_all_unreachable() {
    let targets = default_targets(&["/api", "", "/emergency"], false);
    let report = probe().run(&refused_base(), &targets).await;

    assert_eq!(report.total, targets.len());
    assert_eq!(report.unreachable, report.total);
    assert!(report.results.iter().all(|r| r.status == ProbeStatus::Unreachable));
    assert!(report.results.iter().all(|r| r.detail.is_some()));
    assert!(!report.is_passing());
}

#[tokio::test]
async fn test_healthy_backend_passes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;
    for resource in ["/community/posts", "/community/segments", "/products"] {
        Mock::given(method("GET"))
            .and(path(resource))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": [], "count": 0})),
            )
            .mount(&server)
            .await;
    }

    let report = probe().run(&server.uri(), &default_targets(&[""], false)).await;
    assert!(report.is_passing(), "{}", report.summary());
    assert_eq!(report.well_formed, 4);
}

#[tokio::test]
async fn test_missing_alias_is_reachable_but_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
        .mount(&server)
        .await;

    let report = probe().run(&server.uri(), &default_targets(&["/api"], false)).await;
    let products = report.results.iter().find(|r| r.url.ends_with("/api/products")).expect("target");
    assert_eq!(products.status, ProbeStatus::ReachableWellFormed);

    let posts = report.results.iter().find(|r| r.url.ends_with("/api/community/posts")).expect("target");
    assert_eq!(posts.status, ProbeStatus::ReachableMalformed);
    assert_eq!(posts.http_status, Some(404));
    assert!(!report.is_passing());
}

#[tokio::test]
async fn test_write_probe_posts_marker_tag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/community/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let targets: Vec<_> =
        default_targets(&[""], true).into_iter().filter(|t| t.body.is_some()).collect();
    let report = probe().run(&server.uri(), &targets).await;
    assert!(report.is_passing(), "{}", report.summary());

    let requests = server.received_requests().await.expect("recording enabled");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).expect("json body");
    assert_eq!(body["tags"][0], "__probe__");
}
