//! Health/Diagnostic Probe.
//!
//! Walks a static list of expected endpoints on one base URL and reports
//! reachability and response shape. Every failure mode ends up in the
//! report; `run` itself cannot fail.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use wingrox_types::{HttpMethod, ResourceKind, PROBE_TAG};

use crate::error::ClientError;

pub const PROBE_AUTHOR: &str = "wingrox-health-probe";
pub const PROBE_SEGMENT: &str = "probe";

const PROBE_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    ReachableWellFormed,
    ReachableMalformed,
    Unreachable,
}

impl ProbeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ReachableWellFormed => "reachable_well_formed",
            Self::ReachableMalformed => "reachable_malformed",
            Self::Unreachable => "unreachable",
        }
    }
}

/// What a well-formed answer looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    /// `{"status": "ok" | "degraded", ...}`
    Health,
    /// 2xx with `{"success": true, ...}`
    Envelope,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeTarget {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    pub expect: Expectation,
}

impl ProbeTarget {
    pub fn get(name: impl Into<String>, path: impl Into<String>, expect: Expectation) -> Self {
        Self { name: name.into(), method: HttpMethod::Get, path: path.into(), body: None, expect }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    pub name: String,
    pub method: HttpMethod,
    pub url: String,
    pub status: ProbeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeReport {
    pub base_url: String,
    pub checked_at: DateTime<Utc>,
    pub total: usize,
    pub well_formed: usize,
    pub malformed: usize,
    pub unreachable: usize,
    pub results: Vec<ProbeResult>,
}

impl ProbeReport {
    fn new(base_url: &str, results: Vec<ProbeResult>) -> Self {
        let count = |status: ProbeStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            base_url: base_url.to_string(),
            checked_at: Utc::now(),
            total: results.len(),
            well_formed: count(ProbeStatus::ReachableWellFormed),
            malformed: count(ProbeStatus::ReachableMalformed),
            unreachable: count(ProbeStatus::Unreachable),
            results,
        }
    }

    /// Passing only when every target answered well-formed.
    pub fn is_passing(&self) -> bool {
        self.total > 0 && self.well_formed == self.total
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {}/{} well-formed, {} malformed, {} unreachable",
            self.base_url, self.well_formed, self.total, self.malformed, self.unreachable
        )
    }
}

/// `/health`, then the list endpoint of every resource under every prefix.
/// With `include_writes`, also one probe post per prefix.
pub fn default_targets<P: AsRef<str>>(alias_prefixes: &[P], include_writes: bool) -> Vec<ProbeTarget> {
    let mut targets = vec![ProbeTarget::get("health", "/health", Expectation::Health)];
    for prefix in alias_prefixes {
        let prefix = prefix.as_ref().trim_end_matches('/');
        for kind in ResourceKind::ALL {
            let path = format!("{}{}", prefix, kind.path());
            targets.push(ProbeTarget::get(
                format!("list {}", kind.collection()),
                path,
                Expectation::Envelope,
            ));
        }
    }
    if include_writes {
        for prefix in alias_prefixes {
            let prefix = prefix.as_ref().trim_end_matches('/');
            targets.push(ProbeTarget {
                name: "create post".to_string(),
                method: HttpMethod::Post,
                path: format!("{}{}", prefix, ResourceKind::Post.path()),
                body: Some(json!({
                    "segmentId": PROBE_SEGMENT,
                    "author": PROBE_AUTHOR,
                    "content": format!("health probe at {}", Utc::now().to_rfc3339()),
                    "tags": [PROBE_TAG],
                })),
                expect: Expectation::Envelope,
            });
        }
    }
    targets
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Why a reachable answer is not well-formed, if it is not.
fn shape_problem(expect: Expectation, status: u16, body: Option<&Value>) -> Option<String> {
    let Some(body) = body else {
        return Some("body is not JSON".to_string());
    };
    match expect {
        Expectation::Health => match body.get("status").and_then(Value::as_str) {
            Some("ok" | "degraded") => None,
            Some(other) => Some(format!("unexpected health status '{}'", other)),
            None => Some("missing health status".to_string()),
        },
        Expectation::Envelope if !(200..300).contains(&status) => Some(format!("HTTP {}", status)),
        Expectation::Envelope => match body.get("success") {
            Some(Value::Bool(true)) => None,
            Some(_) => Some(
                body.get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("envelope reports failure")
                    .to_string(),
            ),
            None => Some("not a response envelope".to_string()),
        },
    }
}

pub struct HealthProbe {
    http: Client,
    timeout: Duration,
}

impl HealthProbe {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        if timeout.is_zero() {
            return Err(ClientError::Config("probe timeout must be greater than zero".into()));
        }
        Ok(Self { http: Client::builder().build()?, timeout })
    }

    pub async fn run(&self, base_url: &str, targets: &[ProbeTarget]) -> ProbeReport {
        let base = base_url.trim_end_matches('/');
        let results: Vec<ProbeResult> = stream::iter(targets)
            .map(|target| self.check(base, target))
            .buffered(PROBE_CONCURRENCY)
            .collect()
            .await;
        let report = ProbeReport::new(base_url, results);
        if report.is_passing() {
            tracing::info!("Probe passed | {}", report.summary());
        } else {
            tracing::warn!("Probe failed | {}", report.summary());
        }
        report
    }

    pub async fn check(&self, base: &str, target: &ProbeTarget) -> ProbeResult {
        let url = format!("{}{}", base, target.path);
        let started = Instant::now();
        let mut result = ProbeResult {
            name: target.name.clone(),
            method: target.method,
            url: url.clone(),
            status: ProbeStatus::Unreachable,
            http_status: None,
            latency_ms: 0,
            detail: None,
        };

        let mut request = self.http.request(reqwest_method(target.method), &url).timeout(self.timeout);
        if let Some(body) = &target.body {
            request = request.json(body);
        }

        match request.send().await {
            Err(e) => {
                result.detail = Some(if e.is_timeout() {
                    format!("timed out after {}ms", self.timeout.as_millis())
                } else {
                    e.to_string()
                });
            },
            Ok(response) => {
                let status = response.status().as_u16();
                result.http_status = Some(status);
                match response.bytes().await {
                    Err(e) => result.detail = Some(format!("reading body: {}", e)),
                    Ok(bytes) => {
                        let body: Option<Value> = serde_json::from_slice(&bytes).ok();
                        result.detail = shape_problem(target.expect, status, body.as_ref());
                        result.status = if result.detail.is_none() {
                            ProbeStatus::ReachableWellFormed
                        } else {
                            ProbeStatus::ReachableMalformed
                        };
                    },
                }
            },
        }

        result.latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::debug!("probe {} {} -> {}", target.method, url, result.status.as_str());
        result
    }
}
