//! Generic resource handlers: list, get, create, update, increment, soft delete.
//!
//! Each handler is instantiated once per service and registered under every
//! alias, so all aliases share one code path and one store.

use axum::extract::{FromRef, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use std::collections::HashMap;

use wingrox_core::{ListQuery, ResourceOps};
use wingrox_types::{CounterField, Envelope};

use super::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;

/// Bound shared by every service a handler can be instantiated for.
pub trait ServiceHandle: ResourceOps + Clone + FromRef<AppState> {}

impl<S> ServiceHandle for S where S: ResourceOps + Clone + FromRef<AppState> {}

pub async fn list<S: ServiceHandle>(
    State(service): State<S>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<S::Item>> {
    let query = ListQuery::from_params(&params)?;
    let filter = S::filter_from_params(&params);
    let records = service.records().list(&filter, &query).await?;
    Ok(Json(Envelope::list(records)))
}

pub async fn get<S: ServiceHandle>(State(service): State<S>, Path(id): Path<String>) -> ApiResult<S::Item> {
    let record = service.records().get(&id).await?;
    Ok(Json(Envelope::ok(record)))
}

pub async fn create<S: ServiceHandle>(
    State(service): State<S>,
    ApiJson(new): ApiJson<S::New>,
) -> Result<(StatusCode, Json<Envelope<S::Item>>), ApiError> {
    let created = service.create(new).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(created))))
}

pub async fn update<S: ServiceHandle>(
    State(service): State<S>,
    Path(id): Path<String>,
    ApiJson(changes): ApiJson<S::Changes>,
) -> ApiResult<S::Item> {
    let updated = service.update(&id, changes).await?;
    Ok(Json(Envelope::ok(updated)))
}

async fn increment<S: ServiceHandle>(service: S, id: &str, field: CounterField) -> ApiResult<S::Item> {
    let updated = service.records().increment(id, field).await?;
    Ok(Json(Envelope::ok(updated)))
}

pub async fn like<S: ServiceHandle>(State(service): State<S>, Path(id): Path<String>) -> ApiResult<S::Item> {
    increment(service, &id, CounterField::Likes).await
}

pub async fn bookmark<S: ServiceHandle>(State(service): State<S>, Path(id): Path<String>) -> ApiResult<S::Item> {
    increment(service, &id, CounterField::Bookmarks).await
}

pub async fn view<S: ServiceHandle>(State(service): State<S>, Path(id): Path<String>) -> ApiResult<S::Item> {
    increment(service, &id, CounterField::Views).await
}

pub async fn delete<S: ServiceHandle>(State(service): State<S>, Path(id): Path<String>) -> ApiResult<S::Item> {
    let deleted = service.records().soft_delete(&id).await?;
    Ok(Json(Envelope::ok(deleted)))
}
