//! Atlas API Gateway
//!
//! Accepts a product description, forwards it to the analysis pipeline,
//! records the result and serves the analysis history.

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

pub mod app_state;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod schema;
pub mod storage;

#[cfg(test)]
mod test_support;

pub use app_state::AppState;
pub use error::GatewayError;

use handlers::{analysis_routes, health_routes};

/// 构建路由，所有接口挂在 /api 下
pub fn create_app(app_state: AppState) -> Router {
    // 创建中间件层
    let middleware_layer = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(axum::middleware::from_fn(middleware::request_logging));

    Router::new()
        .nest("/api", analysis_routes().merge(health_routes()))
        .layer(middleware_layer)
        .with_state(app_state)
}

/// 初始化日志，默认 info 级别，可用 RUST_LOG 覆盖
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}
