//! # WinGrox Core
//!
//! Core logic for the WinGrox gateway.
//!
//! ## Architecture
//!
//! ```text
//! wingrox-core/src/
//! ├── store/        # DocumentStore contract + memory and JSON-file backends
//! ├── repository.rs # Typed view of one collection
//! ├── service/      # Posts, segments, products (validation, filters, counters)
//! ├── routing/      # Alias sets and the conflict-free route registrar
//! └── config.rs     # ServerConfig loading: defaults -> file -> env
//! ```
//!
//! Nothing in here holds global state: the store is built once and injected
//! into the services, which are injected into the router state.

pub mod config;
pub mod repository;
pub mod routing;
pub mod service;
pub mod store;

pub use repository::Repository;
pub use routing::{AliasSet, RouteConflict, RouteEntry, RouteRegistrar};
pub use service::{
    Catalogue, ListQuery, PostService, ProductService, ResourceOps, ResourceService,
    SegmentService, ServiceError, SortOrder, SortSpec,
};
pub use store::{open_store, Document, DocumentStore, Filter, StoreError, Update};
