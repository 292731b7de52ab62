//! Test helpers for wingrox-server unit tests.

use axum_test::TestServer;
use std::sync::Arc;

use wingrox_core::store::MemoryStore;
use wingrox_types::ServerConfig;

use crate::router::build_router;
use crate::state::AppState;

/// A minimal `AppState` over an empty in-memory store.
pub fn test_app_state() -> AppState {
    AppState::new_with_store(ServerConfig::default(), Arc::new(MemoryStore::new()))
}

/// The full router, default aliases, behind an in-process test server.
pub fn test_server(state: AppState) -> TestServer {
    let router = build_router(state).expect("default routes do not conflict");
    TestServer::new(router).expect("failed to start test server")
}
