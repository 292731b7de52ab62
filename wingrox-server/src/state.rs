//! Application State
//!
//! Holds the single document store and the resource services built on it.

use anyhow::{Context, Result};
use axum::extract::FromRef;
use std::sync::Arc;

use wingrox_core::service::seed::ensure_default_segments;
use wingrox_core::{open_store, Catalogue, DocumentStore, PostService, ProductService, SegmentService};
use wingrox_types::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub(crate) inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    pub config: ServerConfig,
    pub store: Arc<dyn DocumentStore>,
    pub catalogue: Catalogue,
}

impl AppState {
    /// Open the configured store and seed it when enabled.
    pub async fn from_config(config: ServerConfig) -> Result<Self> {
        let store = open_store(&config.store).await.context("opening document store")?;
        let state = Self::new_with_store(config, store);

        if state.inner.config.seed_segments {
            let inserted = ensure_default_segments(&state.inner.catalogue.segments)
                .await
                .context("seeding default segments")?;
            if inserted > 0 {
                tracing::info!("Seeded {} default segments", inserted);
            }
        }
        Ok(state)
    }

    /// Create AppState around an already opened store
    pub fn new_with_store(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        let catalogue = Catalogue::new(store.clone());
        Self { inner: Arc::new(AppStateInner { config, store, catalogue }) }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.store
    }
}

impl FromRef<AppState> for PostService {
    fn from_ref(state: &AppState) -> Self {
        state.inner.catalogue.posts.clone()
    }
}

impl FromRef<AppState> for SegmentService {
    fn from_ref(state: &AppState) -> Self {
        state.inner.catalogue.segments.clone()
    }
}

impl FromRef<AppState> for ProductService {
    fn from_ref(state: &AppState) -> Self {
        state.inner.catalogue.products.clone()
    }
}
