// 分析管道客户端 - 调用外部 /run-agents 接口
use std::time::Duration;

use async_trait::async_trait;
use atlas_shared::{truncate_string, AnalysisRequest, AnalysisResult, PipelineConfig};
use tracing::debug;

use crate::error::GatewayError;

/// 外部分析管道
#[async_trait]
pub trait AnalysisPipeline: Send + Sync {
    async fn run(&self, product_text: &str) -> Result<AnalysisResult, GatewayError>;
}

/// 通过 HTTP 调用分析管道
#[derive(Clone)]
pub struct HttpPipeline {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPipeline {
    pub fn new(config: &PipelineConfig) -> Result<Self, GatewayError> {
        let mut builder = reqwest::Client::builder();
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!("{}/run-agents", config.url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnalysisPipeline for HttpPipeline {
    async fn run(&self, product_text: &str) -> Result<AnalysisResult, GatewayError> {
        debug!("POST {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AnalysisRequest {
                product_text: product_text.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Upstream(format!(
                "Analysis pipeline returned {}: {}",
                status,
                truncate_string(&body, 200)
            )));
        }

        Ok(response.json::<AnalysisResult>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    async fn spawn_pipeline(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(url: String) -> PipelineConfig {
        PipelineConfig { url, timeout_secs: 5 }
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let pipeline = HttpPipeline::new(&config("http://agents:8000/".to_string())).unwrap();
        assert_eq!(pipeline.endpoint(), "http://agents:8000/run-agents");
    }

    #[tokio::test]
    async fn test_returns_pipeline_result_unmodified() {
        let app = Router::new().route(
            "/run-agents",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"score": 0.8, "echo": body["productText"]}))
            }),
        );
        let url = spawn_pipeline(app).await;

        let pipeline = HttpPipeline::new(&config(url)).unwrap();
        let result = pipeline.run("Wireless Mouse").await.unwrap();

        assert_eq!(result, json!({"score": 0.8, "echo": "Wireless Mouse"}));
    }

    #[tokio::test]
    async fn test_error_status_is_upstream_error() {
        let app = Router::new().route(
            "/run-agents",
            post(|| async {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "model overloaded"})))
            }),
        );
        let url = spawn_pipeline(app).await;

        let pipeline = HttpPipeline::new(&config(url)).unwrap();
        let err = pipeline.run("Wireless Mouse").await.unwrap_err();

        match err {
            GatewayError::Upstream(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("model overloaded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_upstream_error() {
        // 先占用再释放端口，确保没有服务在监听
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let pipeline = HttpPipeline::new(&config(format!("http://{}", addr))).unwrap();
        let err = pipeline.run("Wireless Mouse").await.unwrap_err();

        assert!(matches!(err, GatewayError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_upstream_error() {
        let app = Router::new().route("/run-agents", post(|| async { "not json" }));
        let url = spawn_pipeline(app).await;

        let pipeline = HttpPipeline::new(&config(url)).unwrap();
        let err = pipeline.run("Wireless Mouse").await.unwrap_err();

        assert!(matches!(err, GatewayError::Upstream(_)));
    }
}
