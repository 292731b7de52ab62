//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

pub const DEFAULT_PORT: u16 = 8080;

/// Historically used path prefixes, in preference order. `""` is the bare path.
pub const DEFAULT_ALIAS_PREFIXES: &[&str] = &["/api", "", "/emergency"];

/// Full server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Interface to bind
    #[validate(length(min = 1_u64))]
    pub host: String,
    /// Port to listen on
    #[validate(range(min = 1_u16))]
    pub port: u16,
    /// Prefixes every resource path is exposed under
    #[validate(length(min = 1_u64))]
    pub alias_prefixes: Vec<String>,
    /// Backing document store
    pub store: StoreConfig,
    /// Insert the default community segments at startup when missing
    pub seed_segments: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            alias_prefixes: DEFAULT_ALIAS_PREFIXES.iter().map(|p| (*p).to_string()).collect(),
            store: StoreConfig::default(),
            seed_segments: true,
        }
    }
}

/// Which document store backs the resources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StoreConfig {
    /// Process-local, lost on restart
    #[default]
    Memory,
    /// Snapshot persisted to a JSON file after every write
    JsonFile { path: PathBuf },
}
