//! Community post model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::resource::default_active;
use super::{Counters, Resource, ResourceKind};

/// A post published into a community segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// Segment the post belongs to
    pub segment_id: String,
    /// Display name of the author
    pub author: String,
    /// Optional headline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Body text
    pub content: String,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Engagement counters
    #[serde(flatten)]
    pub counters: Counters,
    /// Soft-delete flag
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Build a fresh post from a validated create request.
    pub fn from_new(id: String, new: NewPost, now: DateTime<Utc>) -> Self {
        Self {
            id,
            segment_id: new.segment_id,
            author: new.author,
            title: new.title,
            content: new.content,
            tags: new.tags,
            counters: Counters::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Resource for Post {
    const KIND: ResourceKind = ResourceKind::Post;

    fn id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn counters(&self) -> Counters {
        self.counters
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Request body for `POST /community/posts`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    #[validate(length(min = 1_u64, max = 64_u64))]
    pub segment_id: String,
    #[validate(length(min = 1_u64, max = 120_u64))]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200_u64))]
    pub title: Option<String>,
    #[validate(length(min = 1_u64, max = 10000_u64))]
    pub content: String,
    #[serde(default)]
    #[validate(length(max = 20_u64))]
    pub tags: Vec<String>,
}

/// Request body for `PUT /community/posts/:id`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200_u64))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1_u64, max = 10000_u64))]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20_u64))]
    pub tags: Option<Vec<String>>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.tags.is_none()
    }
}
