//! The narrow document-store contract the rest of the gateway depends on.
//!
//! The store is an opaque collaborator: find/insert/update/delete by id and
//! by equality filter, plus a liveness ping. No indexing, no transactions.
//! Counter increments go through [`Update::Increment`] so a backend can
//! apply them atomically instead of forcing a read-modify-write on callers.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// A stored record. Every document carries a string `id` field.
pub type Document = Map<String, Value>;

pub const ID_FIELD: &str = "id";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Document in {collection} has no string id")]
    MissingId { collection: String },

    #[error("Duplicate id {id} in {collection}")]
    DuplicateId { collection: String, id: String },

    #[error("Invalid update on {collection}/{id}: {message}")]
    InvalidUpdate { collection: String, id: String, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage IO error: {0}")]
    Io(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Equality filter. A document matches when every condition holds; an
/// array-valued field matches when it contains the expected value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|(field, expected)| match document.get(field) {
            Some(Value::Array(items)) if !expected.is_array() => items.contains(expected),
            Some(actual) => actual == expected,
            None => expected.is_null(),
        })
    }
}

/// A mutation applied to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Overwrite the given top-level fields. `id` cannot be changed.
    Set(Document),
    /// Add `by` to an unsigned integer field (missing counts as 0).
    Increment { field: String, by: u64 },
}

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Short backend identifier reported by `/health`.
    fn backend(&self) -> &'static str;

    /// Insert a new document. Fails on a missing or duplicate id.
    async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Matching documents in insertion order.
    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    /// Apply `update` and return the updated document. `None` when the
    /// document is absent or does not match `guard`; the check and the write
    /// happen as one step.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        guard: &Filter,
        update: Update,
    ) -> Result<Option<Document>, StoreError>;

    /// Physically remove a document. Returns whether it existed.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Apply an update to a document in place. Shared by every in-process backend.
pub(crate) fn apply_update(
    collection: &str,
    id: &str,
    document: &mut Document,
    update: Update,
) -> Result<(), StoreError> {
    match update {
        Update::Set(fields) => {
            if let Some(new_id) = fields.get(ID_FIELD) {
                if new_id.as_str() != Some(id) {
                    return Err(StoreError::InvalidUpdate {
                        collection: collection.to_string(),
                        id: id.to_string(),
                        message: "id is immutable".to_string(),
                    });
                }
            }
            for (key, value) in fields {
                document.insert(key, value);
            }
            Ok(())
        },
        Update::Increment { field, by } => {
            let current = match document.get(&field) {
                None | Some(Value::Null) => 0,
                Some(value) => value.as_u64().ok_or_else(|| StoreError::InvalidUpdate {
                    collection: collection.to_string(),
                    id: id.to_string(),
                    message: format!("field {} is not an unsigned integer", field),
                })?,
            };
            let next = current.checked_add(by).ok_or_else(|| StoreError::InvalidUpdate {
                collection: collection.to_string(),
                id: id.to_string(),
                message: format!("field {} would overflow", field),
            })?;
            document.insert(field, Value::from(next));
            Ok(())
        },
    }
}

pub(crate) fn document_id(collection: &str, document: &Document) -> Result<String, StoreError> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::MissingId { collection: collection.to_string() })
}
