use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
    routing::{get, post},
    Router,
};
use atlas_shared::{truncate_string, AnalysisRecord, AnalysisRequest, AnalysisResult, NewAnalysis};
use tracing::{error, info};

use crate::app_state::AppState;
use crate::error::GatewayError;

// 分析商品文本：调用管道，保存记录，原样返回管道结果
pub async fn analyze_product(
    State(app_state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>, GatewayError> {
    let Json(request) = payload?;
    info!("Analyzing product text: {}", truncate_string(&request.product_text, 80));

    let result = app_state
        .pipeline
        .run(&request.product_text)
        .await
        .inspect_err(|e| error!("Analysis pipeline call failed: {}", e))?;

    let record = app_state
        .store
        .insert(NewAnalysis::new(request.product_text, result))
        .await
        .inspect_err(|e| error!("Failed to store analysis result: {}", e))?;

    info!("Analysis {} stored in {} backend", record.id, app_state.store.name());
    Ok(Json(record.result))
}

// 获取分析历史，最新的在前
pub async fn get_history(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<AnalysisRecord>>, GatewayError> {
    let records = app_state
        .store
        .recent(app_state.history_limit)
        .await
        .inspect_err(|e| error!("Failed to load analysis history: {}", e))?;

    Ok(Json(records))
}

pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-product", post(analyze_product))
        .route("/history", get(get_history))
}
