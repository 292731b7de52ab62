//! In-memory document store.
//!
//! Each collection keeps its documents in insertion order with a side index
//! from id to position. Every mutation happens under the write lock, so
//! concurrent increments on the same counter are never lost.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

use super::traits::{apply_update, document_id, Document, DocumentStore, Filter, StoreError, Update};

#[derive(Debug, Default, Clone)]
struct Collection {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
}

impl Collection {
    fn from_documents(name: &str, documents: Vec<Document>) -> Result<Self, StoreError> {
        let mut collection = Self::default();
        for document in documents {
            collection.push(name, document)?;
        }
        Ok(collection)
    }

    fn push(&mut self, name: &str, document: Document) -> Result<(), StoreError> {
        let id = document_id(name, &document)?;
        if self.index.contains_key(&id) {
            return Err(StoreError::DuplicateId { collection: name.to_string(), id });
        }
        self.index.insert(id, self.documents.len());
        self.documents.push(document);
        Ok(())
    }

    fn remove(&mut self, id: &str) -> bool {
        let Some(position) = self.index.remove(id) else {
            return false;
        };
        self.documents.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        true
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot produced by [`MemoryStore::snapshot`].
    pub fn from_snapshot(snapshot: BTreeMap<String, Vec<Document>>) -> Result<Self, StoreError> {
        let mut collections = HashMap::with_capacity(snapshot.len());
        for (name, documents) in snapshot {
            let collection = Collection::from_documents(&name, documents)?;
            collections.insert(name, collection);
        }
        Ok(Self { collections: RwLock::new(collections) })
    }

    /// Copy of every collection, in insertion order.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<Document>> {
        self.collections
            .read()
            .iter()
            .map(|(name, collection)| (name.clone(), collection.documents.clone()))
            .collect()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections.read().get(collection).map_or(0, |c| c.documents.len())
    }

    pub fn is_empty(&self) -> bool {
        self.collections.read().values().all(|c| c.documents.is_empty())
    }

    /// Replace every collection with the contents of `other`.
    pub fn replace_with(&self, other: MemoryStore) {
        *self.collections.write() = other.collections.into_inner();
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError> {
        let mut collections = self.collections.write();
        let target = collections.entry(collection.to_string()).or_default();
        target.push(collection, document.clone())?;
        Ok(document)
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|c| c.index.get(id).and_then(|&position| c.documents.get(position)))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|c| c.documents.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        guard: &Filter,
        update: Update,
    ) -> Result<Option<Document>, StoreError> {
        let mut collections = self.collections.write();
        let Some(target) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(&position) = target.index.get(id) else {
            return Ok(None);
        };
        let Some(document) = target.documents.get_mut(position).filter(|d| guard.matches(d)) else {
            return Ok(None);
        };
        // Work on a copy so a rejected update leaves the stored document untouched.
        let mut updated = document.clone();
        apply_update(collection, id, &mut updated, update)?;
        *document = updated.clone();
        Ok(Some(updated))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write();
        Ok(collections.get_mut(collection).is_some_and(|c| c.remove(id)))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
