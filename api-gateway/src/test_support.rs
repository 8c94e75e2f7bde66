use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use atlas_shared::{AnalysisRecord, AnalysisResult, NewAnalysis};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::app_state::AppState;
use crate::error::GatewayError;
use crate::pipeline::AnalysisPipeline;
use crate::storage::{AnalysisStore, MemoryStore, StorageHealth};

/// 返回固定结果的管道
pub struct StubPipeline {
    response: Result<AnalysisResult, String>,
    calls: AtomicUsize,
}

impl StubPipeline {
    pub fn returning(result: AnalysisResult) -> Self {
        Self {
            response: Ok(result),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisPipeline for StubPipeline {
    async fn run(&self, _product_text: &str) -> Result<AnalysisResult, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone().map_err(GatewayError::Upstream)
    }
}

/// 所有操作都失败的存储
pub struct UnavailableStore;

#[async_trait]
impl AnalysisStore for UnavailableStore {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn insert(&self, _analysis: NewAnalysis) -> Result<AnalysisRecord, GatewayError> {
        Err(GatewayError::Storage("connection refused".to_string()))
    }

    async fn recent(&self, _limit: Option<usize>) -> Result<Vec<AnalysisRecord>, GatewayError> {
        Err(GatewayError::Storage("connection refused".to_string()))
    }

    async fn health_check(&self) -> StorageHealth {
        StorageHealth::new(self.name()).with_store("document", false)
    }

    async fn close(&self) {}
}

pub fn app_with(
    pipeline: Arc<dyn AnalysisPipeline>,
    store: Arc<dyn AnalysisStore>,
    history_limit: Option<usize>,
) -> Router {
    crate::create_app(AppState::new(pipeline, store, history_limit))
}

pub fn memory_app(pipeline: Arc<dyn AnalysisPipeline>) -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (app_with(pipeline, store.clone(), None), store)
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
