use axum::Router;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use wingrox_core::{
    AliasSet, PostService, ProductService, RouteConflict, RouteEntry, RouteRegistrar, SegmentService,
};
use wingrox_types::{HttpMethod, ResourceKind};

use crate::api::{self, health, resources, resources::ServiceHandle};
use crate::state::AppState;

/// Register every operation of one resource under every alias prefix.
fn register_resource<S: ServiceHandle>(
    registrar: &mut RouteRegistrar<AppState>,
    kind: ResourceKind,
    prefixes: &[String],
) -> Result<(), RouteConflict> {
    let base = AliasSet::from_prefixes(prefixes, kind.path());
    let by_id = base.join(":id");
    let name = |action: &str| format!("{}.{}", kind.collection(), action);

    registrar.register(&name("list"), HttpMethod::Get, &base, resources::list::<S>)?;
    registrar.register(&name("create"), HttpMethod::Post, &base, resources::create::<S>)?;
    registrar.register(&name("get"), HttpMethod::Get, &by_id, resources::get::<S>)?;
    registrar.register(&name("update"), HttpMethod::Put, &by_id, resources::update::<S>)?;
    registrar.register(&name("delete"), HttpMethod::Delete, &by_id, resources::delete::<S>)?;
    registrar.register(&name("like"), HttpMethod::Put, &by_id.join("like"), resources::like::<S>)?;
    registrar.register(&name("bookmark"), HttpMethod::Put, &by_id.join("bookmark"), resources::bookmark::<S>)?;
    registrar.register(&name("view"), HttpMethod::Put, &by_id.join("view"), resources::view::<S>)?;
    Ok(())
}

/// All resource and health routes, before state and middleware are attached.
pub fn build_registrar(prefixes: &[String]) -> Result<RouteRegistrar<AppState>, RouteConflict> {
    let mut registrar = RouteRegistrar::new();
    register_resource::<PostService>(&mut registrar, ResourceKind::Post, prefixes)?;
    register_resource::<SegmentService>(&mut registrar, ResourceKind::Segment, prefixes)?;
    register_resource::<ProductService>(&mut registrar, ResourceKind::Product, prefixes)?;
    registrar.register(
        "health",
        HttpMethod::Get,
        &AliasSet::new(["/health", "/healthz"]),
        health::health_check,
    )?;
    Ok(registrar)
}

/// The route table for `wingrox routes`.
pub fn route_table(prefixes: &[String]) -> Result<Vec<RouteEntry>, RouteConflict> {
    Ok(build_registrar(prefixes)?.into_parts().1)
}

pub fn build_router(state: AppState) -> Result<Router, RouteConflict> {
    let registrar = build_registrar(&state.config().alias_prefixes)?;
    tracing::info!("Registered {} operations", registrar.routes().len());

    Ok(registrar
        .into_router()
        .fallback(api::route_not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)))
}
