use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use atlas_shared::{now_utc, HealthResponse};
use serde_json::{json, Value};

use crate::app_state::AppState;

/// 存活探针，不检查任何依赖
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// 存储层健康检查，有存储不可达时返回 503
pub async fn storage_health_check(State(app_state): State<AppState>) -> (StatusCode, Json<Value>) {
    let health = app_state.store.health_check().await;
    let healthy = health.is_healthy();

    let body = json!({
        "status": if healthy { "ok" } else { "degraded" },
        "backend": health.backend,
        "stores": health.stores,
        "timestamp": now_utc(),
        "uptime_seconds": app_state.uptime_seconds(),
    });

    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/storage", get(storage_health_check))
}
