//! Alias-aware routing.

mod alias;
mod registrar;

pub use alias::{normalize_path, AliasSet};
pub use registrar::{RouteConflict, RouteEntry, RouteRegistrar};
