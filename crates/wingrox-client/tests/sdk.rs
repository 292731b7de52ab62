#![allow(clippy::tests_outside_test_module, reason = "integration tests live in tests/ dir")]
#![allow(clippy::expect_used, reason = "panics are the assertion mechanism in tests")]

use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use wingrox_client::{ClientConfig, ClientError, RetryConfig, WingroxClient};
use wingrox_types::{ErrorKind, NewPost, Post};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn refused_base() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn post_json(id: &str, likes: u64) -> Value {
    json!({
        "id": id,
        "segmentId": "career-plateau",
        "author": "dana",
        "content": "stuck at senior for five years",
        "tags": [],
        "likes": likes,
        "bookmarks": 0,
        "views": 0,
        "isActive": true,
        "createdAt": "2026-01-01T00:00:00Z",
        "updatedAt": "2026-01-01T00:00:00Z"
    })
}

fn config(base_urls: Vec<String>) -> ClientConfig {
    ClientConfig {
        base_urls,
        timeout_ms: 1_000,
        retry: RetryConfig { max_retries: 0, ..RetryConfig::default() },
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn test_typed_list_falls_back_across_hosts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/community/posts"))
        .and(query_param("segmentId", "career-plateau"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [post_json("p1", 3), post_json("p2", 0)],
            "count": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = WingroxClient::new(config(vec![refused_base(), server.uri()])).expect("client");
    let posts = client.posts_in_segment("career-plateau").await.expect("served by second host");
    assert_eq!(posts.iter().map(|p| p.id.as_str()).collect::<Vec<_>>(), vec!["p1", "p2"]);
    assert_eq!(posts[0].counters.likes, 3);
}

#[tokio::test]
async fn test_writes_never_leave_primary_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true, "data": post_json("p1", 0)})))
        .expect(0)
        .mount(&server)
        .await;

    let client = WingroxClient::new(config(vec![refused_base(), server.uri()])).expect("client");
    let new = NewPost {
        segment_id: "career-plateau".into(),
        author: "dana".into(),
        title: None,
        content: "hello".into(),
        tags: vec![],
    };
    let err = client.create_post(&new).await.expect_err("primary host is down");
    assert_eq!(err.kind(), ErrorKind::AllEndpointsFailed);
    match err {
        ClientError::Fallback(e) => assert_eq!(e.attempts().len(), 3),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_shared_store_tag_allows_cross_host_writes() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/community/posts/p1/like"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": post_json("p1", 1)})))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config(vec![refused_base(), server.uri()]);
    cfg.store_tag = Some("shared".into());
    let client = WingroxClient::new(cfg).expect("client");
    let post: Post = client.like_post("p1").await.expect("second host answers");
    assert_eq!(post.counters.likes, 1);
}

/// Fails with 503 until `failures` requests have been seen.
struct FlakyThenOk {
    seen: Arc<AtomicU32>,
    failures: u32,
}

impl Respond for FlakyThenOk {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        if self.seen.fetch_add(1, Ordering::SeqCst) < self.failures {
            ResponseTemplate::new(503)
        } else {
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": post_json("p1", 0)}))
        }
    }
}

#[tokio::test]
async fn test_reads_are_retried_after_total_failure() {
    let server = MockServer::start().await;
    let seen = Arc::new(AtomicU32::new(0));
    Mock::given(method("GET"))
        .and(path("/community/posts/p1"))
        .respond_with(FlakyThenOk { seen: Arc::clone(&seen), failures: 1 })
        .mount(&server)
        .await;

    let mut cfg = config(vec![server.uri()]);
    cfg.alias_prefixes = vec![String::new()];
    cfg.retry = RetryConfig { max_retries: 2, base_delay_ms: 10, max_delay_ms: 20, jitter: false, retry_writes: false };
    let client = WingroxClient::new(cfg).expect("client");

    let post: Post = client.get("p1").await.expect("second round succeeds");
    assert_eq!(post.id, "p1");
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_undecodable_data_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/community/posts/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"id": 7}})))
        .mount(&server)
        .await;

    let client = WingroxClient::new(config(vec![server.uri()])).expect("client");
    let err = client.get::<Post>("p1").await.expect_err("shape mismatch");
    assert!(matches!(err, ClientError::Decode { .. }));
}
