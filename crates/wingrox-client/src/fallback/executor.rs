use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};
use wingrox_types::{Envelope, ErrorKind, HttpMethod};

use super::{
    AttemptOutcome, AttemptRecord, CallArgs, Candidate, EndpointStats, FallbackError,
    FallbackResponse, Operation,
};
use crate::error::ClientError;

/// A failed attempt and whether the next candidate may be tried.
struct Failure {
    error: FallbackError,
    advance: bool,
}

impl Failure {
    fn advance(error: FallbackError) -> Self {
        Self { error, advance: true }
    }

    fn stop(error: FallbackError) -> Self {
        Self { error, advance: false }
    }
}

struct Success {
    status: u16,
    data: Value,
    count: Option<usize>,
}

fn reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

/// Executes operations candidate by candidate. Cheap to clone; clones share
/// the HTTP connection pool and the endpoint counters.
#[derive(Debug, Clone)]
pub struct FallbackClient {
    http: Client,
    timeout: Duration,
    stats: EndpointStats,
}

impl FallbackClient {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder().build()?;
        Self::with_http(http, timeout)
    }

    pub fn with_http(http: Client, timeout: Duration) -> Result<Self, ClientError> {
        if timeout.is_zero() {
            return Err(ClientError::Config("per-candidate timeout must be greater than zero".into()));
        }
        Ok(Self { http, timeout, stats: EndpointStats::new() })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stats(&self) -> &EndpointStats {
        &self.stats
    }

    /// Try every candidate in declared order, at most once each.
    pub async fn execute(
        &self,
        operation: &Operation,
        args: &CallArgs,
    ) -> Result<FallbackResponse, FallbackError> {
        let total = operation.candidates().len();
        let mut attempts: Vec<AttemptRecord> = Vec::with_capacity(total);
        let mut last: Option<FallbackError> = None;

        for (index, candidate) in operation.candidates().iter().enumerate() {
            let url = candidate.render(args).map_err(|message| FallbackError::InvalidRequest {
                operation: operation.name().to_string(),
                message,
            })?;

            let started = Instant::now();
            let result = self.attempt(operation, candidate, url.as_str(), args).await;
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

            match result {
                Ok(success) => {
                    self.stats.record_success(&candidate.url_template);
                    attempts.push(AttemptRecord {
                        candidate: index,
                        method: candidate.method,
                        url: url.to_string(),
                        outcome: AttemptOutcome::Success { status: success.status },
                        elapsed_ms,
                    });
                    if index > 0 {
                        tracing::info!(
                            "Fallback succeeded | Operation: {} | Endpoint: {} | Attempt: {}/{}",
                            operation.name(),
                            url,
                            index + 1,
                            total
                        );
                    } else {
                        tracing::debug!("{} served by {} ({}ms)", operation.name(), url, elapsed_ms);
                    }
                    return Ok(FallbackResponse {
                        status: success.status,
                        data: success.data,
                        count: success.count,
                        served_by: index,
                        attempts,
                    });
                },
                Err(failure) => {
                    let kind = failure.error.kind();
                    if kind.drives_fallback() || kind == ErrorKind::AmbiguousEffect {
                        self.stats.record_failure(&candidate.url_template, kind);
                    }
                    attempts.push(AttemptRecord {
                        candidate: index,
                        method: candidate.method,
                        url: url.to_string(),
                        outcome: failure.error.to_outcome(),
                        elapsed_ms,
                    });

                    if !failure.advance {
                        return Err(match failure.error {
                            FallbackError::AmbiguousEffect { operation, url, message, .. } => {
                                tracing::error!(
                                    "{} at {} has an unknown outcome, not trying further candidates: {}",
                                    operation,
                                    url,
                                    message
                                );
                                FallbackError::AmbiguousEffect { operation, url, message, attempts }
                            },
                            other => other,
                        });
                    }

                    if index + 1 < total {
                        tracing::warn!(
                            "{} failed at {} ({}), trying next candidate",
                            operation.name(),
                            url,
                            failure.error
                        );
                    }
                    last = Some(failure.error);
                },
            }
        }

        let last = last.unwrap_or_else(|| FallbackError::InvalidRequest {
            operation: operation.name().to_string(),
            message: "operation has no candidates".to_string(),
        });
        tracing::error!(
            "All {} candidates failed for {}, last error: {}",
            attempts.len(),
            operation.name(),
            last
        );
        Err(FallbackError::AllEndpointsFailed {
            operation: operation.name().to_string(),
            attempts,
            last: Box::new(last),
        })
    }

    async fn attempt(
        &self,
        operation: &Operation,
        candidate: &Candidate,
        url: &str,
        args: &CallArgs,
    ) -> Result<Success, Failure> {
        let idempotent = operation.idempotency().is_idempotent();
        let ambiguous = |message: String| FallbackError::AmbiguousEffect {
            operation: operation.name().to_string(),
            url: url.to_string(),
            message,
            attempts: Vec::new(),
        };
        // Idempotent calls treat "maybe sent" like "never arrived".
        let after_send = |message: String| {
            if idempotent {
                Failure::advance(FallbackError::Unreachable { url: url.to_string(), message })
            } else {
                Failure::stop(ambiguous(message))
            }
        };

        let mut request =
            self.http.request(reqwest_method(candidate.method), url).timeout(self.timeout);
        if let Some(body) = &args.body {
            request = request.json(body);
        }
        tracing::debug!("{} -> {} {}", operation.name(), candidate.method, url);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_builder() => {
                return Err(Failure::advance(FallbackError::Unreachable {
                    url: url.to_string(),
                    message: e.to_string(),
                }));
            },
            Err(e) if e.is_timeout() => {
                return Err(after_send(format!("timed out after {}ms", self.timeout.as_millis())));
            },
            Err(e) => return Err(after_send(e.to_string())),
        };

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) if status.is_success() => return Err(after_send(format!("reading body: {}", e))),
            Err(e) => {
                return Err(Failure::advance(FallbackError::EndpointFailed {
                    url: url.to_string(),
                    status: status.as_u16(),
                    message: format!("reading body: {}", e),
                }));
            },
        };
        let envelope: Option<Envelope<Value>> = serde_json::from_slice(&bytes).ok();

        if status.is_success() {
            return match envelope.map(Envelope::into_result) {
                Some(Ok((data, count))) => Ok(Success { status: status.as_u16(), data, count }),
                _ => {
                    let message = "body is not a success envelope".to_string();
                    if idempotent {
                        Err(Failure::advance(FallbackError::Malformed {
                            url: url.to_string(),
                            status: status.as_u16(),
                            message,
                        }))
                    } else {
                        Err(Failure::stop(ambiguous(format!("{} ({})", message, status))))
                    }
                },
            };
        }

        let (kind, message) = match envelope.map(Envelope::into_result) {
            Some(Err((kind, message))) => (kind, Some(message)),
            _ => (None, None),
        };
        let message =
            message.unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

        match (status, kind) {
            (
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY,
                Some(ErrorKind::ValidationError),
            ) => {
                Err(Failure::stop(FallbackError::Validation {
                    url: url.to_string(),
                    status: status.as_u16(),
                    message,
                }))
            },
            (StatusCode::NOT_FOUND, Some(ErrorKind::NotFound)) => {
                Err(Failure::stop(FallbackError::NotFound { url: url.to_string(), message }))
            },
            _ => Err(Failure::advance(FallbackError::EndpointFailed {
                url: url.to_string(),
                status: status.as_u16(),
                message,
            })),
        }
    }
}
