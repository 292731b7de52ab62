//! JSON-file backed store.
//!
//! Reads go to an in-memory copy. A write holds `write_lock`, applies the
//! change to a staged copy, rewrites the whole snapshot to disk (temp file +
//! rename) and only then swaps the staged copy in. A write whose file update
//! fails is not visible to anyone.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, MutexGuard};

use super::memory::MemoryStore;
use super::traits::{Document, DocumentStore, Filter, StoreError, Update};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    #[serde(default)]
    collections: BTreeMap<String, Vec<Document>>,
}

pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file starts an empty store; the
    /// file (and its parent directories) are created on the first write.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let inner = match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let file: StoreFile = serde_json::from_str(&content).map_err(|e| {
                    StoreError::Serialization(format!("{}: {}", path.display(), e))
                })?;
                if file.version != FORMAT_VERSION {
                    return Err(StoreError::Serialization(format!(
                        "{}: unsupported store format version {}",
                        path.display(),
                        file.version
                    )));
                }
                MemoryStore::from_snapshot(file.collections)?
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Store file {} not found, starting empty", path.display());
                MemoryStore::new()
            },
            Err(e) => return Err(StoreError::Io(format!("{}: {}", path.display(), e))),
        };

        Ok(Self { path, inner, write_lock: Mutex::new(()) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stage a copy of the current state under the write lock. Callers apply
    /// their change to it and hand it to [`JsonFileStore::commit`].
    async fn stage(&self) -> Result<(MutexGuard<'_, ()>, MemoryStore), StoreError> {
        let guard = self.write_lock.lock().await;
        let staged = MemoryStore::from_snapshot(self.inner.snapshot())?;
        Ok((guard, staged))
    }

    async fn commit(
        &self,
        _guard: MutexGuard<'_, ()>,
        staged: MemoryStore,
    ) -> Result<(), StoreError> {
        self.persist(&staged).await?;
        self.inner.replace_with(staged);
        Ok(())
    }

    async fn persist(&self, state: &MemoryStore) -> Result<(), StoreError> {
        let file = StoreFile { version: FORMAT_VERSION, collections: state.snapshot() };
        let content = serde_json::to_string_pretty(&file)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::Io(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json_file"
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError> {
        let (guard, staged) = self.stage().await?;
        let inserted = staged.insert(collection, document).await?;
        self.commit(guard, staged).await?;
        Ok(inserted)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.inner.find_by_id(collection, id).await
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        self.inner.find(collection, filter).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        guard: &Filter,
        update: Update,
    ) -> Result<Option<Document>, StoreError> {
        let (lock, staged) = self.stage().await?;
        let updated = staged.update(collection, id, guard, update).await?;
        if updated.is_some() {
            self.commit(lock, staged).await?;
        }
        Ok(updated)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let (guard, staged) = self.stage().await?;
        let existed = staged.delete(collection, id).await?;
        if existed {
            self.commit(guard, staged).await?;
        }
        Ok(existed)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("."),
        };
        match tokio::fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(StoreError::Unavailable(format!("{} is not a directory", dir.display()))),
            // Parent is created lazily on first write; absence alone is fine as long as
            // nothing has been written yet.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && self.inner.is_empty() => Ok(()),
            Err(e) => Err(StoreError::Unavailable(format!("{}: {}", dir.display(), e))),
        }
    }
}
