#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "panics are the assertion mechanism in tests")]

use serde_json::json;
use std::time::Duration;
use wingrox_client::{
    AttemptOutcome, CallArgs, Candidate, FallbackClient, FallbackError, Operation, StoreTag,
};
use wingrox_types::{ErrorKind, HttpMethod, Idempotency};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Base URL of a port nothing listens on.
fn refused_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn client(timeout_ms: u64) -> FallbackClient {
    FallbackClient::new(Duration::from_millis(timeout_ms)).expect("client")
}

fn store() -> StoreTag {
    StoreTag::new("primary")
}

fn candidate(method: HttpMethod, url: String) -> Candidate {
    Candidate::new(method, url, store())
}

fn success(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": data}))
}

fn outcome_kind(outcome: &AttemptOutcome) -> Option<ErrorKind> {
    match outcome {
        AttemptOutcome::Success { .. } => None,
        AttemptOutcome::Failure { kind, .. } => Some(*kind),
    }
}

#[tokio::test]
async fn test_create_reaches_emergency_alias_after_two_refusals() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/emergency/community/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "data": {"id": "p1", "likes": 0, "bookmarks": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let operation = Operation::new(
        "posts.create",
        Idempotency::NonIdempotent,
        vec![
            candidate(HttpMethod::Post, format!("{}/api/community/posts", refused_base())),
            candidate(HttpMethod::Post, format!("{}/community/posts", refused_base())),
            candidate(HttpMethod::Post, format!("{}/emergency/community/posts", server.uri())),
        ],
    )
    .expect("valid operation");

    let args = CallArgs::new().with_body(json!({"segmentId": "career-plateau", "author": "a", "content": "c"}));
    let response = client(1_000).execute(&operation, &args).await.expect("third candidate succeeds");

    assert_eq!(response.status, 201);
    assert_eq!(response.served_by, 2);
    assert_eq!(response.data["likes"], 0);
    assert_eq!(response.data["bookmarks"], 0);
    assert_eq!(response.attempts.len(), 3);
    assert_eq!(outcome_kind(&response.attempts[0].outcome), Some(ErrorKind::EndpointUnreachable));
    assert_eq!(outcome_kind(&response.attempts[1].outcome), Some(ErrorKind::EndpointUnreachable));
    assert_eq!(outcome_kind(&response.attempts[2].outcome), None);
}

#[tokio::test]
async fn test_later_candidates_untouched_after_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(success(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/emergency/products"))
        .respond_with(success(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let operation = Operation::new(
        "products.list",
        Idempotency::Idempotent,
        ["/api/products", "/products", "/emergency/products"]
            .iter()
            .map(|p| candidate(HttpMethod::Get, format!("{}{}", server.uri(), p)))
            .collect(),
    )
    .expect("valid operation");

    let response = client(1_000).execute(&operation, &CallArgs::new()).await.expect("second succeeds");
    assert_eq!(response.served_by, 1);
    assert_eq!(outcome_kind(&response.attempts[0].outcome), Some(ErrorKind::EndpointFailed));
}

#[tokio::test]
async fn test_all_candidates_fail_once_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/community/segments"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    // Route missing on this alias: plain 404 without an envelope.
    Mock::given(method("GET"))
        .and(path("/community/segments"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dead = refused_base();
    let operation = Operation::new(
        "segments.list",
        Idempotency::Idempotent,
        vec![
            candidate(HttpMethod::Get, format!("{}/api/community/segments", server.uri())),
            candidate(HttpMethod::Get, format!("{}/community/segments", server.uri())),
            candidate(HttpMethod::Get, format!("{}/emergency/community/segments", dead)),
        ],
    )
    .expect("valid operation");

    let err = client(1_000).execute(&operation, &CallArgs::new()).await.expect_err("all fail");
    assert_eq!(err.kind(), ErrorKind::AllEndpointsFailed);
    assert_eq!(err.last_error().kind(), ErrorKind::EndpointUnreachable);

    let attempts = err.attempts();
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts.iter().map(|a| a.candidate).collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(outcome_kind(&attempts[0].outcome), Some(ErrorKind::EndpointFailed));
    assert_eq!(outcome_kind(&attempts[1].outcome), Some(ErrorKind::EndpointFailed));
    assert!(attempts[2].url.starts_with(&dead));
}

#[tokio::test]
async fn test_timeout_on_write_is_ambiguous_and_stops() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/community/posts/p1/like"))
        .respond_with(success(json!({"id": "p1", "likes": 1})).set_delay(Duration::from_millis(800)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/community/posts/p1/like"))
        .respond_with(success(json!({"id": "p1", "likes": 2})))
        .expect(0)
        .mount(&server)
        .await;

    let operation = Operation::new(
        "posts.like",
        Idempotency::NonIdempotent,
        vec![
            candidate(HttpMethod::Put, format!("{}/api/community/posts/:id/like", server.uri())),
            candidate(HttpMethod::Put, format!("{}/community/posts/:id/like", server.uri())),
        ],
    )
    .expect("valid operation");

    let args = CallArgs::new().with_param("id", "p1");
    let err = client(150).execute(&operation, &args).await.expect_err("ambiguous");
    assert_eq!(err.kind(), ErrorKind::AmbiguousEffect);
    assert_eq!(err.attempts().len(), 1);
}

#[tokio::test]
async fn test_timeout_on_read_advances() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/community/posts/p1"))
        .respond_with(success(json!({"id": "p1"})).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/community/posts/p1"))
        .respond_with(success(json!({"id": "p1"})))
        .expect(1)
        .mount(&server)
        .await;

    let operation = Operation::new(
        "posts.get",
        Idempotency::Idempotent,
        vec![
            candidate(HttpMethod::Get, format!("{}/api/community/posts/:id", server.uri())),
            candidate(HttpMethod::Get, format!("{}/community/posts/:id", server.uri())),
        ],
    )
    .expect("valid operation");

    let args = CallArgs::new().with_param("id", "p1");
    let response = client(150).execute(&operation, &args).await.expect("second answers");
    assert_eq!(response.served_by, 1);
    assert_eq!(outcome_kind(&response.attempts[0].outcome), Some(ErrorKind::EndpointUnreachable));
}

#[tokio::test]
async fn test_validation_error_is_surfaced_not_advanced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "success": false,
            "error": "name: length",
            "errorKind": "validation_error"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .respond_with(success(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let operation = Operation::new(
        "products.create",
        Idempotency::NonIdempotent,
        vec![
            candidate(HttpMethod::Post, format!("{}/api/products", server.uri())),
            candidate(HttpMethod::Post, format!("{}/products", server.uri())),
        ],
    )
    .expect("valid operation");

    let err = client(1_000)
        .execute(&operation, &CallArgs::new().with_body(json!({"name": ""})))
        .await
        .expect_err("validation");
    assert!(matches!(err, FallbackError::Validation { status: 422, .. }));
}

#[tokio::test]
async fn test_not_found_envelope_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "error": "product ghost not found",
            "errorKind": "not_found"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/ghost"))
        .respond_with(success(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let operation = Operation::new(
        "products.get",
        Idempotency::Idempotent,
        vec![
            candidate(HttpMethod::Get, format!("{}/api/products/:id", server.uri())),
            candidate(HttpMethod::Get, format!("{}/products/:id", server.uri())),
        ],
    )
    .expect("valid operation");

    let err = client(1_000)
        .execute(&operation, &CallArgs::new().with_param("id", "ghost"))
        .await
        .expect_err("not found");
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_malformed_success_advances_reads_but_not_writes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/community/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/community/posts"))
        .respond_with(success(json!([])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/community/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_string("created?"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/community/posts"))
        .respond_with(success(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let read = Operation::new(
        "posts.list",
        Idempotency::Idempotent,
        vec![
            candidate(HttpMethod::Get, format!("{}/api/community/posts", server.uri())),
            candidate(HttpMethod::Get, format!("{}/community/posts", server.uri())),
        ],
    )
    .expect("valid operation");
    let response = client(1_000).execute(&read, &CallArgs::new()).await.expect("read recovers");
    assert_eq!(outcome_kind(&response.attempts[0].outcome), Some(ErrorKind::MalformedResponse));

    let write = Operation::new(
        "posts.create",
        Idempotency::NonIdempotent,
        vec![
            candidate(HttpMethod::Post, format!("{}/api/community/posts", server.uri())),
            candidate(HttpMethod::Post, format!("{}/community/posts", server.uri())),
        ],
    )
    .expect("valid operation");
    let err = client(1_000)
        .execute(&write, &CallArgs::new().with_body(json!({})))
        .await
        .expect_err("write is ambiguous");
    assert_eq!(err.kind(), ErrorKind::AmbiguousEffect);
}

#[tokio::test]
async fn test_failure_counters_never_skip_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500))
        .expect(8)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(success(json!([])))
        .expect(8)
        .mount(&server)
        .await;

    let operation = Operation::new(
        "products.list",
        Idempotency::Idempotent,
        vec![
            candidate(HttpMethod::Get, format!("{}/api/products", server.uri())),
            candidate(HttpMethod::Get, format!("{}/products", server.uri())),
        ],
    )
    .expect("valid operation");

    let client = client(1_000);
    for _ in 0..8 {
        client.execute(&operation, &CallArgs::new()).await.expect("second succeeds");
    }

    let first = client.stats().get(&format!("{}/api/products", server.uri())).expect("tracked");
    assert_eq!(first.failures, 8);
    assert_eq!(first.consecutive_failures, 8);
    let second = client.stats().get(&format!("{}/products", server.uri())).expect("tracked");
    assert_eq!(second.successes, 8);
}

#[tokio::test]
async fn test_success_envelope_without_data_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "count": 0})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [],
            "count": 0
        })))
        .mount(&server)
        .await;

    let operation = Operation::new(
        "products.list",
        Idempotency::Idempotent,
        vec![
            candidate(HttpMethod::Get, format!("{}/api/products", server.uri())),
            candidate(HttpMethod::Get, format!("{}/products", server.uri())),
        ],
    )
    .expect("valid operation");

    let response = client(1_000).execute(&operation, &CallArgs::new()).await.expect("second alias");
    assert_eq!(response.served_by, 1);
    assert_eq!(response.count, Some(0));
    assert_eq!(outcome_kind(&response.attempts[0].outcome), Some(ErrorKind::MalformedResponse));
}
