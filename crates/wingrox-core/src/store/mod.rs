//! Resource Store: document collections behind the [`DocumentStore`] contract.

mod json_file;
mod memory;
mod traits;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use traits::{Document, DocumentStore, Filter, StoreError, Update, ID_FIELD};

use std::sync::Arc;

use wingrox_types::StoreConfig;

/// Build the configured backend. The returned handle is the single store
/// every alias of every resource is served from.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::JsonFile { path } => {
            let store = JsonFileStore::open(path).await?;
            tracing::info!("Opened JSON store at {}", store.path().display());
            Ok(Arc::new(store))
        },
    }
}
