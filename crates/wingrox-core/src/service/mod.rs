//! Resource services: validation, list queries, counters and soft delete.
//!
//! [`ResourceService`] holds the behavior every resource shares; the
//! per-resource services add create/update rules and implement
//! [`ResourceOps`] so the HTTP layer can be written once for all of them.

mod posts;
mod products;
mod query;
mod segments;
pub mod seed;

pub use posts::PostService;
pub use products::ProductService;
pub use query::{ListQuery, SortField, SortOrder, SortSpec};
pub use segments::SegmentService;

use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use wingrox_types::{CounterField, ErrorKind, Resource, ResourceKind};

use crate::repository::Repository;
use crate::store::{Document, DocumentStore, Filter, StoreError, Update};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Internal,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// Operations shared by every resource type.
pub struct ResourceService<R> {
    repo: Repository<R>,
}

impl<R> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self { repo: self.repo.clone() }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { repo: Repository::new(store) }
    }

    pub fn repository(&self) -> &Repository<R> {
        &self.repo
    }

    fn not_found(id: &str) -> ServiceError {
        ServiceError::NotFound { kind: R::KIND, id: id.to_string() }
    }

    /// Active record by id. Soft-deleted records are reported as not found.
    pub async fn get(&self, id: &str) -> Result<R, ServiceError> {
        match self.repo.get(id).await? {
            Some(record) if record.is_active() => Ok(record),
            _ => Err(Self::not_found(id)),
        }
    }

    /// Filtered records in insertion order, then sorted and truncated per `query`.
    pub async fn list(&self, filter: &Filter, query: &ListQuery) -> Result<Vec<R>, ServiceError> {
        let mut records: Vec<R> = self
            .repo
            .find(filter)
            .await?
            .into_iter()
            .filter(|r| query.include_inactive || r.is_active())
            .collect();
        query.apply(&mut records);
        Ok(records)
    }

    pub async fn insert(&self, record: R) -> Result<R, ServiceError> {
        match self.repo.insert(&record).await {
            Ok(stored) => Ok(stored),
            Err(StoreError::DuplicateId { id, .. }) => {
                Err(ServiceError::validation(format!("{} {} already exists", R::KIND, id)))
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite fields of an active record and bump `updatedAt`.
    pub async fn apply(&self, id: &str, mut changes: Document) -> Result<R, ServiceError> {
        changes.insert("updatedAt".to_string(), timestamp_value()?);
        self.repo
            .update(id, &active_only(), Update::Set(changes))
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    /// Atomically add one to a counter of an active record.
    pub async fn increment(&self, id: &str, field: CounterField) -> Result<R, ServiceError> {
        let update = Update::Increment { field: field.field_name().to_string(), by: 1 };
        let updated = self
            .repo
            .update(id, &active_only(), update)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        tracing::debug!("{} {} {} -> {}", R::KIND, id, field.action(), updated.counters().get(field));
        Ok(updated)
    }

    /// Mark a record inactive. Deleting an already-deleted record is not found.
    pub async fn soft_delete(&self, id: &str) -> Result<R, ServiceError> {
        let mut changes = Document::new();
        changes.insert("isActive".to_string(), Value::Bool(false));
        let deleted = self.apply(id, changes).await?;
        tracing::info!("Soft-deleted {} {}", R::KIND, id);
        Ok(deleted)
    }
}

/// Mutations only ever land on records that are still active.
fn active_only() -> Filter {
    Filter::new().eq("isActive", true)
}

fn timestamp_value() -> Result<Value, ServiceError> {
    serde_json::to_value(Utc::now()).map_err(|e| StoreError::Serialization(e.to_string()).into())
}

/// Uniform surface the HTTP layer is generic over.
#[async_trait]
pub trait ResourceOps: Send + Sync + 'static {
    type Item: Resource;
    type New: DeserializeOwned + Send + 'static;
    type Changes: DeserializeOwned + Send + 'static;

    /// `(query parameter, document field)` pairs accepted as list filters.
    const FILTERS: &'static [(&'static str, &'static str)];

    fn records(&self) -> &ResourceService<Self::Item>;

    async fn create(&self, new: Self::New) -> Result<Self::Item, ServiceError>;

    async fn update(&self, id: &str, changes: Self::Changes) -> Result<Self::Item, ServiceError>;

    fn filter_from_params(params: &HashMap<String, String>) -> Filter {
        Self::FILTERS.iter().fold(Filter::new(), |filter, (param, field)| match params.get(*param) {
            Some(value) if !value.is_empty() => filter.eq(*field, value.as_str()),
            _ => filter,
        })
    }
}

/// Every resource service, sharing one store.
#[derive(Clone)]
pub struct Catalogue {
    pub posts: PostService,
    pub segments: SegmentService,
    pub products: ProductService,
}

impl Catalogue {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            posts: PostService::new(store.clone()),
            segments: SegmentService::new(store.clone()),
            products: ProductService::new(store),
        }
    }
}

/// Trim every tag, drop empties and duplicates, keep first-seen order.
pub(crate) fn normalize_tags(tags: Vec<String>) -> Result<Vec<String>, ServiceError> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() {
            continue;
        }
        if tag.len() > 40 {
            return Err(ServiceError::validation(format!("tag too long: {}", tag)));
        }
        if !normalized.iter().any(|t| t == tag) {
            normalized.push(tag.to_string());
        }
    }
    Ok(normalized)
}

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::validation(format!("{} must not be blank", field)));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use wingrox_types::{NewPost, Post};

    /// Serves every read as if the record were still active, while writes go
    /// to the real store. Models a soft delete landing between a read and a write.
    struct StaleReads(Arc<MemoryStore>);

    fn as_active(mut document: Document) -> Document {
        document.insert("isActive".to_string(), Value::Bool(true));
        document
    }

    #[async_trait]
    impl DocumentStore for StaleReads {
        fn backend(&self) -> &'static str {
            "stale"
        }

        async fn insert(&self, collection: &str, document: Document) -> Result<Document, StoreError> {
            self.0.insert(collection, document).await
        }

        async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
            Ok(self.0.find_by_id(collection, id).await?.map(as_active))
        }

        async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
            Ok(self.0.find(collection, filter).await?.into_iter().map(as_active).collect())
        }

        async fn update(
            &self,
            collection: &str,
            id: &str,
            guard: &Filter,
            update: Update,
        ) -> Result<Option<Document>, StoreError> {
            self.0.update(collection, id, guard, update).await
        }

        async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
            self.0.delete(collection, id).await
        }

        async fn ping(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_counter_never_moves_on_a_deleted_record() {
        let backing = Arc::new(MemoryStore::new());
        let posts = PostService::new(Arc::new(StaleReads(backing.clone())));
        let post = posts
            .create(NewPost {
                segment_id: "burnout".into(),
                author: "dana".into(),
                title: None,
                content: "x".into(),
                tags: vec![],
            })
            .await
            .unwrap();
        posts.records().soft_delete(&post.id).await.unwrap();

        let records: &ResourceService<Post> = posts.records();
        assert!(matches!(
            records.increment(&post.id, CounterField::Likes).await,
            Err(ServiceError::NotFound { .. })
        ));
        let mut changes = Document::new();
        changes.insert("content".to_string(), Value::from("edited"));
        assert!(matches!(records.apply(&post.id, changes).await, Err(ServiceError::NotFound { .. })));

        let stored = backing.find_by_id("posts", &post.id).await.unwrap().unwrap();
        assert_eq!(stored["likes"], 0);
        assert_eq!(stored["content"], "x");
        assert_eq!(stored["isActive"], false);
    }
}
