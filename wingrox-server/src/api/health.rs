//! `/health` and `/healthz`: always HTTP 200, body says whether the store answers.

use axum::extract::State;
use axum::response::Json;
use std::collections::BTreeMap;
use std::time::Instant;

use wingrox_types::{DependencyHealth, HealthResponse, HealthStatus};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.store();
    let started = Instant::now();
    let ping = store.ping().await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let dependency = match ping {
        Ok(()) => DependencyHealth {
            status: HealthStatus::Ok,
            backend: store.backend().to_string(),
            latency_ms,
            error: None,
        },
        Err(e) => {
            tracing::warn!("Health check: store ping failed: {}", e);
            DependencyHealth {
                status: HealthStatus::Degraded,
                backend: store.backend().to_string(),
                latency_ms,
                error: Some(e.to_string()),
            }
        },
    };

    let dependencies = BTreeMap::from([("store".to_string(), dependency)]);
    Json(HealthResponse::from_dependencies(env!("CARGO_PKG_VERSION"), dependencies))
}
