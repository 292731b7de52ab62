#![doc = include_str!("../README.md")]

mod catalogue;
mod client;
mod error;
pub mod fallback;
pub mod probe;
mod retry;
mod types;

pub use catalogue::{plan, Action, OperationSpec};
pub use client::WingroxClient;
pub use error::ClientError;
pub use fallback::{
    AttemptOutcome, AttemptRecord, CallArgs, Candidate, EndpointCounters, EndpointStats, FallbackClient,
    FallbackError, FallbackResponse, Operation, OperationError, StoreTag,
};
pub use probe::{
    default_targets, Expectation, HealthProbe, ProbeReport, ProbeResult, ProbeStatus, ProbeTarget,
};
pub use retry::{with_retry, RetryPolicy};
pub use types::*;
