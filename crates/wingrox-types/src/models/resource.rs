//! The `Resource` abstraction shared by posts, segments and products.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::Counters;

/// The resource families exposed over REST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Post,
    Segment,
    Product,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Post, Self::Segment, Self::Product];

    /// Store collection holding this resource.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Post => "posts",
            Self::Segment => "segments",
            Self::Product => "products",
        }
    }

    /// Canonical resource path, without any alias prefix.
    pub fn path(self) -> &'static str {
        match self {
            Self::Post => "/community/posts",
            Self::Segment => "/community/segments",
            Self::Product => "/products",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Segment => "segment",
            Self::Product => "product",
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named, identified record type stored as a JSON document.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> &str;

    fn is_active(&self) -> bool;

    fn counters(&self) -> Counters;

    fn created_at(&self) -> DateTime<Utc>;
}

pub(crate) fn default_active() -> bool {
    true
}
