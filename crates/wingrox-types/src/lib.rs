//! # WinGrox Types
//!
//! Core types, models, and error definitions for the WinGrox gateway.
//!
//! This crate provides the foundational type system shared by the server,
//! the store and the fallback client:
//!
//! - **`error`** - Error kinds carried on the wire and configuration errors
//! - **`models`** - Resources (Post, Segment, Product), the response envelope,
//!   endpoint descriptors, health payloads and server configuration
//!
//! ## Architecture Role
//!
//! `wingrox-types` sits at the bottom of the dependency graph:
//!
//! ```text
//!                 wingrox-types (this crate)
//!                        │
//!            ┌───────────┴───────────┐
//!            ▼                       ▼
//!      wingrox-core            wingrox-client
//!            │                       │
//!            └───────────┬───────────┘
//!                        ▼
//!                 wingrox-server
//! ```

pub mod error;
pub mod models;

pub use error::{ConfigError, ErrorKind};

pub use models::{
    is_valid_slug, slugify, CounterField, Counters, DependencyHealth, Envelope, HealthResponse,
    HealthStatus, HttpMethod, Idempotency, NewPost, NewProduct, NewSegment, Post, PostUpdate,
    Product, ProductUpdate, Resource, ResourceKind, Segment, SegmentUpdate, ServerConfig,
    StoreConfig, DEFAULT_ALIAS_PREFIXES, DEFAULT_CURRENCY, DEFAULT_PORT, PROBE_TAG,
};
