use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;
use wingrox_types::{is_valid_slug, NewPost, Post, PostUpdate};

use super::{normalize_tags, require_text, ResourceOps, ResourceService, ServiceError};
use crate::repository::to_document;
use crate::store::DocumentStore;

/// Community posts. A post names its segment by id; the segment is not
/// required to exist.
#[derive(Clone)]
pub struct PostService {
    records: ResourceService<Post>,
}

impl PostService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { records: ResourceService::new(store) }
    }
}

#[async_trait]
impl ResourceOps for PostService {
    type Item = Post;
    type New = NewPost;
    type Changes = PostUpdate;

    const FILTERS: &'static [(&'static str, &'static str)] =
        &[("segmentId", "segmentId"), ("author", "author"), ("tag", "tags")];

    fn records(&self) -> &ResourceService<Post> {
        &self.records
    }

    async fn create(&self, mut new: NewPost) -> Result<Post, ServiceError> {
        new.validate()?;
        require_text("author", &new.author)?;
        require_text("content", &new.content)?;
        if !is_valid_slug(&new.segment_id) {
            return Err(ServiceError::validation(format!(
                "segmentId '{}' is not a valid slug",
                new.segment_id
            )));
        }
        new.author = new.author.trim().to_string();
        new.tags = normalize_tags(new.tags)?;

        let post = Post::from_new(uuid::Uuid::new_v4().to_string(), new, Utc::now());
        let created = self.records.insert(post).await?;
        tracing::info!("Created post {} in segment {}", created.id, created.segment_id);
        Ok(created)
    }

    async fn update(&self, id: &str, mut changes: PostUpdate) -> Result<Post, ServiceError> {
        changes.validate()?;
        if changes.is_empty() {
            return Err(ServiceError::validation("update must change at least one field"));
        }
        if let Some(content) = &changes.content {
            require_text("content", content)?;
        }
        if let Some(tags) = changes.tags.take() {
            changes.tags = Some(normalize_tags(tags)?);
        }
        self.records.apply(id, to_document(&changes)?).await
    }
}
