//! Community segment model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::resource::default_active;
use super::{Counters, Resource, ResourceKind};

/// An audience segment that posts are grouped under (e.g. `career-plateau`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Slug identifier
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub counters: Counters,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Segment {
    pub fn new(id: String, name: String, description: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            description,
            counters: Counters::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Resource for Segment {
    const KIND: ResourceKind = ResourceKind::Segment;

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

/// Request body for `POST /community/segments`. The id is derived from the
/// name when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewSegment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1_u64, max = 64_u64))]
    pub id: Option<String>,
    #[validate(length(min = 1_u64, max = 120_u64))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000_u64))]
    pub description: Option<String>,
}

/// Request body for `PUT /community/segments/:id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SegmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1_u64, max = 120_u64))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 2000_u64))]
    pub description: Option<String>,
}

impl SegmentUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

/// Lowercase, hyphen-separated ASCII alphanumeric runs.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Derive a slug from a display name: "Career Plateau!" -> "career-plateau".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Career Plateau"), "career-plateau");
        assert_eq!(slugify("  Burnout -- Recovery!! "), "burnout-recovery");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("career-plateau"));
        assert!(is_valid_slug("segment2"));
        assert!(!is_valid_slug("Career"));
        assert!(!is_valid_slug("-leading"));
        assert!(!is_valid_slug("double--dash"));
        assert!(!is_valid_slug(""));
    }
}
