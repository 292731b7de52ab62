//! Fallback Client: one logical operation, several candidate endpoints.
//!
//! An [`Operation`] is an ordered, validated list of [`Candidate`]s. The
//! [`FallbackClient`] tries them strictly in order, one call each, and
//! returns the first success together with an [`AttemptRecord`] per call.

mod endpoint_stats;
mod executor;

pub use endpoint_stats::{EndpointCounters, EndpointStats};
pub use executor::FallbackClient;

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;
use url::Url;
use wingrox_types::{ErrorKind, HttpMethod, Idempotency};

/// Opaque label for the backing store a candidate reaches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StoreTag(String);

impl StoreTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Each origin is its own store unless declared otherwise.
    pub fn from_origin(url: &Url) -> Self {
        Self(url.origin().ascii_serialization())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One endpoint able to serve an operation. Path segments of the form
/// `:name` are filled from [`CallArgs`] parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub method: HttpMethod,
    pub url_template: String,
    pub store: StoreTag,
}

impl Candidate {
    pub fn new(method: HttpMethod, url_template: impl Into<String>, store: StoreTag) -> Self {
        Self { method, url_template: url_template.into(), store }
    }

    fn parse_template(&self) -> Result<Url, String> {
        let url = Url::parse(&self.url_template).map_err(|e| e.to_string())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(format!("unsupported scheme '{}'", url.scheme()));
        }
        if url.cannot_be_a_base() || url.host().is_none() {
            return Err("template has no host".to_string());
        }
        Ok(url)
    }

    /// Concrete URL for one call: placeholders substituted, query appended.
    pub fn render(&self, args: &CallArgs) -> Result<Url, String> {
        let mut url = self.parse_template()?;
        let segments: Vec<String> = match url.path_segments() {
            Some(segments) => segments
                .map(|segment| match segment.strip_prefix(':') {
                    Some(name) => args
                        .param(name)
                        .map(str::to_string)
                        .ok_or_else(|| format!("missing path parameter '{}'", name)),
                    None => Ok(segment.to_string()),
                })
                .collect::<Result<_, _>>()?,
            None => Vec::new(),
        };
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(segments.iter());
        }
        if !args.query.is_empty() {
            url.query_pairs_mut().extend_pairs(args.query.iter());
        }
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("operation '{operation}' has no candidate endpoints")]
    NoCandidates { operation: String },

    #[error("non-idempotent operation '{operation}' spans several stores: {}", .stores.join(", "))]
    MixedStores { operation: String, stores: Vec<String> },

    #[error("operation '{operation}' has an invalid candidate '{template}': {message}")]
    InvalidCandidate { operation: String, template: String, message: String },
}

/// A validated, ordered set of candidates for one logical operation.
#[derive(Debug, Clone, Serialize)]
pub struct Operation {
    name: String,
    idempotency: Idempotency,
    candidates: Vec<Candidate>,
}

impl Operation {
    /// Rejects empty candidate lists, unparseable templates and, for
    /// non-idempotent operations, candidates that do not share one store.
    pub fn new(
        name: impl Into<String>,
        idempotency: Idempotency,
        candidates: Vec<Candidate>,
    ) -> Result<Self, OperationError> {
        let name = name.into();
        if candidates.is_empty() {
            return Err(OperationError::NoCandidates { operation: name });
        }
        for candidate in &candidates {
            candidate.parse_template().map_err(|message| OperationError::InvalidCandidate {
                operation: name.clone(),
                template: candidate.url_template.clone(),
                message,
            })?;
        }
        if !idempotency.is_idempotent() {
            let mut stores: Vec<String> = Vec::new();
            for candidate in &candidates {
                if !stores.iter().any(|s| s == candidate.store.as_str()) {
                    stores.push(candidate.store.to_string());
                }
            }
            if stores.len() > 1 {
                return Err(OperationError::MixedStores { operation: name, stores });
            }
        }
        Ok(Self { name, idempotency, candidates })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn idempotency(&self) -> Idempotency {
        self.idempotency
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }
}

/// Path parameters, query string and JSON body of one call.
#[derive(Debug, Clone, Default)]
pub struct CallArgs {
    pub params: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// What happened on one candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success { status: u16 },
    Failure {
        kind: ErrorKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    /// Position of the candidate in the operation
    pub candidate: usize,
    pub method: HttpMethod,
    pub url: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    pub elapsed_ms: u64,
}

/// First successful answer of an operation.
#[derive(Debug, Clone)]
pub struct FallbackResponse {
    pub status: u16,
    /// `data` of the success envelope (`null` when absent)
    pub data: Value,
    pub count: Option<usize>,
    /// Index of the candidate that answered
    pub served_by: usize,
    pub attempts: Vec<AttemptRecord>,
}

#[derive(Debug, Clone, Error)]
pub enum FallbackError {
    #[error("{url} unreachable: {message}")]
    Unreachable { url: String, message: String },

    #[error("{url} returned {status}: {message}")]
    EndpointFailed { url: String, status: u16, message: String },

    #[error("malformed response from {url} ({status}): {message}")]
    Malformed { url: String, status: u16, message: String },

    #[error("validation failed at {url}: {message}")]
    Validation { url: String, status: u16, message: String },

    #[error("not found at {url}: {message}")]
    NotFound { url: String, message: String },

    #[error("'{operation}' may or may not have taken effect at {url}: {message}")]
    AmbiguousEffect { operation: String, url: String, message: String, attempts: Vec<AttemptRecord> },

    #[error("all {count} candidates failed for '{operation}', last error: {last}", count = .attempts.len())]
    AllEndpointsFailed { operation: String, attempts: Vec<AttemptRecord>, last: Box<FallbackError> },

    #[error("cannot build request for '{operation}': {message}")]
    InvalidRequest { operation: String, message: String },
}

impl FallbackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unreachable { .. } => ErrorKind::EndpointUnreachable,
            Self::EndpointFailed { .. } => ErrorKind::EndpointFailed,
            Self::Malformed { .. } => ErrorKind::MalformedResponse,
            Self::Validation { .. } => ErrorKind::ValidationError,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AmbiguousEffect { .. } => ErrorKind::AmbiguousEffect,
            Self::AllEndpointsFailed { .. } => ErrorKind::AllEndpointsFailed,
            Self::InvalidRequest { .. } => ErrorKind::InvalidOperation,
        }
    }

    /// Underlying error of an aggregate, `self` otherwise.
    pub fn last_error(&self) -> &FallbackError {
        match self {
            Self::AllEndpointsFailed { last, .. } => last.last_error(),
            other => other,
        }
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        match self {
            Self::AllEndpointsFailed { attempts, .. } | Self::AmbiguousEffect { attempts, .. } => attempts,
            _ => &[],
        }
    }

    fn status(&self) -> Option<u16> {
        match self {
            Self::EndpointFailed { status, .. }
            | Self::Malformed { status, .. }
            | Self::Validation { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Unreachable { message, .. }
            | Self::EndpointFailed { message, .. }
            | Self::Malformed { message, .. }
            | Self::Validation { message, .. }
            | Self::NotFound { message, .. }
            | Self::AmbiguousEffect { message, .. }
            | Self::InvalidRequest { message, .. } => message.clone(),
            Self::AllEndpointsFailed { last, .. } => last.message(),
        }
    }

    pub(crate) fn to_outcome(&self) -> AttemptOutcome {
        AttemptOutcome::Failure { kind: self.kind(), status: self.status(), message: self.message() }
    }
}
