//! Typed view of one store collection.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use wingrox_types::Resource;

use crate::store::{Document, DocumentStore, Filter, StoreError, Update};

/// Converts between `R` and raw documents in `R::KIND.collection()`.
pub struct Repository<R> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), _marker: PhantomData }
    }
}

impl<R: Resource> Repository<R> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, _marker: PhantomData }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    fn collection() -> &'static str {
        R::KIND.collection()
    }

    pub async fn insert(&self, record: &R) -> Result<R, StoreError> {
        let document = to_document(record)?;
        let stored = self.store.insert(Self::collection(), document).await?;
        from_document(stored)
    }

    pub async fn get(&self, id: &str) -> Result<Option<R>, StoreError> {
        self.store.find_by_id(Self::collection(), id).await?.map(from_document).transpose()
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<R>, StoreError> {
        self.store
            .find(Self::collection(), filter)
            .await?
            .into_iter()
            .map(from_document)
            .collect()
    }

    pub async fn update(
        &self,
        id: &str,
        guard: &Filter,
        update: Update,
    ) -> Result<Option<R>, StoreError> {
        self.store
            .update(Self::collection(), id, guard, update)
            .await?
            .map(from_document)
            .transpose()
    }
}

pub(crate) fn to_document<T: serde::Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!("expected a JSON object, got {}", other))),
    }
}

fn from_document<R: Resource>(document: Document) -> Result<R, StoreError> {
    serde_json::from_value(Value::Object(document)).map_err(|e| {
        StoreError::Serialization(format!("corrupt {} document: {}", R::KIND.label(), e))
    })
}
