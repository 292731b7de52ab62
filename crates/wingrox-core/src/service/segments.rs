use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;
use wingrox_types::{is_valid_slug, slugify, NewSegment, Segment, SegmentUpdate};

use super::{require_text, ResourceOps, ResourceService, ServiceError};
use crate::repository::to_document;
use crate::store::DocumentStore;

/// Community segments, keyed by slug.
#[derive(Clone)]
pub struct SegmentService {
    records: ResourceService<Segment>,
}

impl SegmentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { records: ResourceService::new(store) }
    }
}

#[async_trait]
impl ResourceOps for SegmentService {
    type Item = Segment;
    type New = NewSegment;
    type Changes = SegmentUpdate;

    const FILTERS: &'static [(&'static str, &'static str)] = &[];

    fn records(&self) -> &ResourceService<Segment> {
        &self.records
    }

    async fn create(&self, new: NewSegment) -> Result<Segment, ServiceError> {
        new.validate()?;
        require_text("name", &new.name)?;

        let id = match new.id {
            Some(id) => id.trim().to_string(),
            None => slugify(&new.name),
        };
        if !is_valid_slug(&id) {
            return Err(ServiceError::validation(format!(
                "segment id '{}' must be a lowercase slug",
                id
            )));
        }

        let segment = Segment::new(id, new.name.trim().to_string(), new.description, Utc::now());
        let created = self.records.insert(segment).await?;
        tracing::info!("Created segment {}", created.id);
        Ok(created)
    }

    async fn update(&self, id: &str, changes: SegmentUpdate) -> Result<Segment, ServiceError> {
        changes.validate()?;
        if changes.is_empty() {
            return Err(ServiceError::validation("update must change at least one field"));
        }
        if let Some(name) = &changes.name {
            require_text("name", name)?;
        }
        self.records.apply(id, to_document(&changes)?).await
    }
}
