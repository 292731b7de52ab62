//! List query parameters shared by every resource: `sort`, `limit`, `includeInactive`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use wingrox_types::{CounterField, Resource};

use super::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    Counter(CounterField),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// `field` sorts ascending, `-field` descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl SortSpec {
    fn compare<R: Resource>(&self, a: &R, b: &R) -> Ordering {
        let ordering = match self.field {
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortField::Counter(field) => a.counters().get(field).cmp(&b.counters().get(field)),
        };
        match self.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl FromStr for SortSpec {
    type Err = ServiceError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        let (order, name) = match raw.strip_prefix('-') {
            Some(rest) => (SortOrder::Descending, rest),
            None => (SortOrder::Ascending, raw.strip_prefix('+').unwrap_or(raw)),
        };
        let field = match name {
            "createdAt" => SortField::CreatedAt,
            "likes" => SortField::Counter(CounterField::Likes),
            "bookmarks" => SortField::Counter(CounterField::Bookmarks),
            "views" => SortField::Counter(CounterField::Views),
            other => {
                return Err(ServiceError::validation(format!(
                    "unsupported sort field '{}' (expected createdAt, likes, bookmarks or views)",
                    other
                )))
            },
        };
        Ok(Self { field, order })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub include_inactive: bool,
    pub sort: Option<SortSpec>,
    pub limit: Option<usize>,
}

impl ListQuery {
    /// Parse the shared parameters out of a raw query map. Resource-specific
    /// filter parameters are ignored here.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ServiceError> {
        let include_inactive = match params.get("includeInactive").map(|v| v.trim()) {
            None | Some("") | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => {
                return Err(ServiceError::validation(format!(
                    "includeInactive must be true or false, got '{}'",
                    other
                )))
            },
        };

        let sort = match params.get("sort").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(raw.parse::<SortSpec>()?),
            None => None,
        };

        let limit = match params.get("limit").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| {
                ServiceError::validation(format!("limit must be a non-negative integer, got '{}'", raw))
            })?),
            None => None,
        };

        Ok(Self { include_inactive, sort, limit })
    }

    /// Sort (stable, so ties keep insertion order) and then truncate.
    pub fn apply<R: Resource>(&self, records: &mut Vec<R>) {
        if let Some(sort) = self.sort {
            records.sort_by(|a, b| sort.compare(a, b));
        }
        if let Some(limit) = self.limit {
            records.truncate(limit);
        }
    }
}
