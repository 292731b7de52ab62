//! Core domain models for WinGrox.
//!
//! This module contains all shared data structures used across the gateway.

mod config;
mod counters;
mod endpoint;
mod envelope;
mod health;
mod post;
mod product;
mod resource;
mod segment;

pub use config::{ServerConfig, StoreConfig, DEFAULT_ALIAS_PREFIXES, DEFAULT_PORT};
pub use counters::{CounterField, Counters};
pub use endpoint::{HttpMethod, Idempotency};
pub use envelope::Envelope;
pub use health::{DependencyHealth, HealthResponse, HealthStatus};
pub use post::{NewPost, Post, PostUpdate};
pub use product::{NewProduct, Product, ProductUpdate, DEFAULT_CURRENCY};
pub use resource::{Resource, ResourceKind};
pub use segment::{is_valid_slug, slugify, NewSegment, Segment, SegmentUpdate};

/// Tag attached to records created by the write probe.
pub const PROBE_TAG: &str = "__probe__";
