//! Engagement counters shared by every resource.

use serde::{Deserialize, Serialize};

/// Mutable engagement counters. Flattened into each resource, so they
/// appear as top-level `likes`/`bookmarks`/`views` fields on the wire.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counters {
    #[serde(default)]
    pub likes: u64,
    #[serde(default)]
    pub bookmarks: u64,
    #[serde(default)]
    pub views: u64,
}

impl Counters {
    pub fn get(&self, field: CounterField) -> u64 {
        match field {
            CounterField::Likes => self.likes,
            CounterField::Bookmarks => self.bookmarks,
            CounterField::Views => self.views,
        }
    }
}

/// A counter that can be incremented through `PUT /:id/{like,bookmark,view}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterField {
    Likes,
    Bookmarks,
    Views,
}

impl CounterField {
    /// Document field holding this counter.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Likes => "likes",
            Self::Bookmarks => "bookmarks",
            Self::Views => "views",
        }
    }

    /// Path segment of the increment action (`like`, `bookmark`, `view`).
    pub fn action(self) -> &'static str {
        match self {
            Self::Likes => "like",
            Self::Bookmarks => "bookmark",
            Self::Views => "view",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_counters_default_to_zero() {
        let counters: Counters = serde_json::from_str(r#"{"likes": 3}"#).unwrap();
        assert_eq!(counters, Counters { likes: 3, bookmarks: 0, views: 0 });
    }

    #[test]
    fn test_counter_lookup() {
        let counters = Counters { likes: 1, bookmarks: 2, views: 3 };
        assert_eq!(counters.get(CounterField::Bookmarks), 2);
        assert_eq!(CounterField::Views.field_name(), "views");
        assert_eq!(CounterField::Likes.action(), "like");
    }
}
