use std::sync::Arc;

use anyhow::Result;
use atlas_shared::AppConfig;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::pipeline::{AnalysisPipeline, HttpPipeline};
use crate::storage::{self, AnalysisStore};

/// 应用程序状态
#[derive(Clone)]
pub struct AppState {
    /// 外部分析管道
    pub pipeline: Arc<dyn AnalysisPipeline>,
    /// 分析记录存储
    pub store: Arc<dyn AnalysisStore>,
    /// 历史记录条数上限
    pub history_limit: Option<usize>,
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<dyn AnalysisPipeline>,
        store: Arc<dyn AnalysisStore>,
        history_limit: Option<usize>,
    ) -> Self {
        Self {
            pipeline,
            store,
            history_limit,
            start_time: Utc::now(),
        }
    }

    /// 按配置创建管道客户端并初始化存储层
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let pipeline = HttpPipeline::new(&config.pipeline)?;
        info!("Analysis pipeline endpoint: {}", pipeline.endpoint());

        let store = storage::connect(config).await?;

        Ok(Self::new(
            Arc::new(pipeline),
            store,
            config.storage.effective_history_limit(),
        ))
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }

    /// 释放存储层连接
    pub async fn shutdown(&self) {
        info!("Closing storage backend: {}", self.store.name());
        self.store.close().await;
    }
}
