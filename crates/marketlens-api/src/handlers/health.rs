//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{CacheHealth, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cache = state.cache();
    let healthy = cache.health_check().await;
    let degraded = cache.is_degraded();

    let status = if healthy && !degraded { "ok" } else { "degraded" };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        cache: CacheHealth {
            backend: cache.active_backend().as_str().to_string(),
            degraded,
            healthy,
        },
    })
}
