//! Per-endpoint success/failure counters.
//!
//! Diagnostics only: the executor records into these but never consults
//! them, so candidate order and coverage are unaffected.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use wingrox_types::ErrorKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointCounters {
    pub successes: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ErrorKind>,
}

/// Shared, cheaply clonable counter table keyed by candidate URL template.
#[derive(Debug, Clone, Default)]
pub struct EndpointStats {
    endpoints: Arc<DashMap<String, EndpointCounters>>,
}

impl EndpointStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, endpoint: &str) {
        let mut entry = self.endpoints.entry(endpoint.to_string()).or_default();
        entry.successes += 1;
        entry.consecutive_failures = 0;
    }

    pub fn record_failure(&self, endpoint: &str, kind: ErrorKind) {
        let mut entry = self.endpoints.entry(endpoint.to_string()).or_default();
        entry.failures += 1;
        entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
        entry.last_error = Some(kind);
    }

    pub fn get(&self, endpoint: &str) -> Option<EndpointCounters> {
        self.endpoints.get(endpoint).map(|e| e.value().clone())
    }

    /// All counters, sorted by endpoint.
    pub fn snapshot(&self) -> Vec<(String, EndpointCounters)> {
        let mut rows: Vec<(String, EndpointCounters)> =
            self.endpoints.iter().map(|e| (e.key().clone(), e.value().clone())).collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }
}
