//! Typed error definitions for WinGrox.
//!
//! [`ErrorKind`] is the tag every failure carries across the wire (as the
//! envelope's `errorKind`) and across the fallback client, so callers can
//! tell "all endpoints down" apart from "the request was invalid".

mod config;

pub use config::ConfigError;

use serde::{Deserialize, Serialize};

/// Classification of a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing request fields. Never retried, never advanced past.
    ValidationError,
    /// The addressed resource does not exist (or was soft-deleted).
    NotFound,
    /// Network/connection failure for one candidate endpoint.
    EndpointUnreachable,
    /// A candidate answered with a definitive non-success status.
    EndpointFailed,
    /// A candidate answered but its body could not be decoded.
    MalformedResponse,
    /// Every candidate of an operation failed.
    AllEndpointsFailed,
    /// A non-idempotent call whose server-side effect is unknown.
    AmbiguousEffect,
    /// An operation could not be planned (no candidates, mixed stores, bad template).
    InvalidOperation,
    /// Server-side failure unrelated to the request itself.
    Internal,
}

impl ErrorKind {
    /// Connectivity-class kinds are the only ones that move the fallback
    /// client on to the next candidate.
    pub fn drives_fallback(self) -> bool {
        matches!(self, Self::EndpointUnreachable | Self::EndpointFailed | Self::MalformedResponse)
    }

    /// Wire representation, identical to the serde tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "validation_error",
            Self::NotFound => "not_found",
            Self::EndpointUnreachable => "endpoint_unreachable",
            Self::EndpointFailed => "endpoint_failed",
            Self::MalformedResponse => "malformed_response",
            Self::AllEndpointsFailed => "all_endpoints_failed",
            Self::AmbiguousEffect => "ambiguous_effect",
            Self::InvalidOperation => "invalid_operation",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
