//! Declarative catalogue of REST operations and how to plan them.

use url::Url;
use wingrox_types::{CounterField, HttpMethod, Idempotency, ResourceKind};

use crate::fallback::{Candidate, Operation, OperationError, StoreTag};
use crate::types::ClientConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Increment(CounterField),
    Delete,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Self::List,
        Self::Get,
        Self::Create,
        Self::Update,
        Self::Increment(CounterField::Likes),
        Self::Increment(CounterField::Bookmarks),
        Self::Increment(CounterField::Views),
        Self::Delete,
    ];

    pub fn method(self) -> HttpMethod {
        match self {
            Self::List | Self::Get => HttpMethod::Get,
            Self::Create => HttpMethod::Post,
            Self::Update | Self::Increment(_) => HttpMethod::Put,
            Self::Delete => HttpMethod::Delete,
        }
    }

    /// Path below the resource collection.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::List | Self::Create => "",
            Self::Get | Self::Update | Self::Delete => ":id",
            Self::Increment(CounterField::Likes) => ":id/like",
            Self::Increment(CounterField::Bookmarks) => ":id/bookmark",
            Self::Increment(CounterField::Views) => ":id/view",
        }
    }

    /// Creates and increments change state on every call; updates set fields
    /// and deletes set a flag, so repeating them is harmless.
    pub fn idempotency(self) -> Idempotency {
        match self {
            Self::List | Self::Get | Self::Update | Self::Delete => Idempotency::Idempotent,
            Self::Create | Self::Increment(_) => Idempotency::NonIdempotent,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Increment(field) => field.action(),
            Self::Delete => "delete",
        }
    }
}

/// One logical REST operation on one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationSpec {
    pub resource: ResourceKind,
    pub action: Action,
}

impl OperationSpec {
    pub const fn new(resource: ResourceKind, action: Action) -> Self {
        Self { resource, action }
    }

    /// Every operation of every resource.
    pub fn all() -> Vec<OperationSpec> {
        ResourceKind::ALL
            .into_iter()
            .flat_map(|resource| Action::ALL.into_iter().map(move |action| Self::new(resource, action)))
            .collect()
    }

    /// e.g. `posts.like`
    pub fn name(&self) -> String {
        format!("{}.{}", self.resource.collection(), self.action.name())
    }

    /// Path relative to a base URL for one alias prefix.
    pub fn path(&self, prefix: &str) -> String {
        let joined = format!("{}/{}/{}", prefix, self.resource.path(), self.action.suffix());
        let segments: Vec<&str> = joined.split('/').filter(|s| !s.is_empty()).collect();
        format!("/{}", segments.join("/"))
    }
}

fn store_for(base: &str, config: &ClientConfig) -> StoreTag {
    match (&config.store_tag, Url::parse(base)) {
        (Some(tag), _) => StoreTag::new(tag.clone()),
        (None, Ok(url)) => StoreTag::from_origin(&url),
        (None, Err(_)) => StoreTag::new(base),
    }
}

/// Expand `spec` into candidates: every base URL (in order), each with every
/// alias prefix (in order). Non-idempotent operations keep only the
/// candidates sharing the first candidate's store.
pub fn plan(spec: OperationSpec, config: &ClientConfig) -> Result<Operation, OperationError> {
    let method = spec.action.method();
    let mut candidates: Vec<Candidate> = Vec::new();
    for base in &config.base_urls {
        let store = store_for(base, config);
        let base = base.trim_end_matches('/');
        for prefix in &config.alias_prefixes {
            let url = format!("{}{}", base, spec.path(prefix));
            if !candidates.iter().any(|c| c.url_template == url) {
                candidates.push(Candidate::new(method, url, store.clone()));
            }
        }
    }

    let idempotency = spec.action.idempotency();
    if !idempotency.is_idempotent() {
        if let Some(primary) = candidates.first().map(|c| c.store.clone()) {
            candidates.retain(|c| c.store == primary);
        }
    }
    Operation::new(spec.name(), idempotency, candidates)
}
