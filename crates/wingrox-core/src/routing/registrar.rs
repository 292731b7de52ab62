//! Route Registrar: binds one handler to every alias of an operation.
//!
//! A registration is checked in full before anything is added to the
//! router, so an alias set is either registered completely or not at all.

use axum::handler::Handler;
use axum::routing::{on, MethodFilter};
use axum::Router;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use wingrox_types::HttpMethod;

use super::alias::AliasSet;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{method} {path} for '{operation}' is already claimed by '{claimed_by}'")]
pub struct RouteConflict {
    pub method: HttpMethod,
    pub path: String,
    pub operation: String,
    pub claimed_by: String,
}

/// One row of the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
    pub method: HttpMethod,
    pub operation: String,
    pub paths: Vec<String>,
}

fn method_filter(method: HttpMethod) -> MethodFilter {
    match method {
        HttpMethod::Get => MethodFilter::GET,
        HttpMethod::Post => MethodFilter::POST,
        HttpMethod::Put => MethodFilter::PUT,
        HttpMethod::Delete => MethodFilter::DELETE,
    }
}

/// Path with parameter names erased, so `/x/:id` and `/x/:key` collide.
fn route_shape(path: &str) -> String {
    path.split('/')
        .map(|segment| if segment.starts_with(':') || segment.starts_with('*') { ":" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

fn with_trailing_slash(path: &str) -> Option<String> {
    (path != "/").then(|| format!("{}/", path))
}

pub struct RouteRegistrar<S = ()> {
    router: Router<S>,
    /// (method, shape) -> operation that owns it
    claims: HashMap<(HttpMethod, String), String>,
    /// shape -> the exact path string registered for it
    shapes: HashMap<String, String>,
    table: Vec<RouteEntry>,
}

impl<S> Default for RouteRegistrar<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> RouteRegistrar<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self { router: Router::new(), claims: HashMap::new(), shapes: HashMap::new(), table: Vec::new() }
    }

    /// Register `handler` for `method` under every path of `aliases`,
    /// each also answered with a trailing slash.
    pub fn register<H, T>(
        &mut self,
        operation: &str,
        method: HttpMethod,
        aliases: &AliasSet,
        handler: H,
    ) -> Result<(), RouteConflict>
    where
        H: Handler<T, S>,
        T: 'static,
    {
        let mut pending: Vec<(String, String)> = Vec::new();
        for alias in aliases.paths() {
            let variants = std::iter::once(alias.clone()).chain(with_trailing_slash(alias));
            for path in variants {
                let shape = route_shape(&path);
                let conflict = |claimed_by: String| RouteConflict {
                    method,
                    path: path.clone(),
                    operation: operation.to_string(),
                    claimed_by,
                };

                if let Some(owner) = self.claims.get(&(method, shape.clone())) {
                    return Err(conflict(owner.clone()));
                }
                if let Some(existing) = self.shapes.get(&shape).filter(|p| **p != path) {
                    return Err(conflict(format!("route {}", existing)));
                }
                if pending.iter().any(|(_, s)| *s == shape) {
                    return Err(conflict(operation.to_string()));
                }
                pending.push((path, shape));
            }
        }

        let mut router = std::mem::take(&mut self.router);
        for (path, shape) in pending {
            router = router.route(&path, on(method_filter(method), handler.clone()));
            self.claims.insert((method, shape.clone()), operation.to_string());
            self.shapes.insert(shape, path);
        }
        self.router = router;

        tracing::debug!("Registered {} {} under {} aliases", method, operation, aliases.len());
        self.table.push(RouteEntry {
            method,
            operation: operation.to_string(),
            paths: aliases.paths().to_vec(),
        });
        Ok(())
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.table
    }

    pub fn into_parts(self) -> (Router<S>, Vec<RouteEntry>) {
        (self.router, self.table)
    }

    pub fn into_router(self) -> Router<S> {
        self.router
    }
}
