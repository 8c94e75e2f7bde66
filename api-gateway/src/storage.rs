// 存储层 - 分析记录的持久化抽象
use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use atlas_shared::{AnalysisRecord, AppConfig, NewAnalysis, StorageBackend};
use serde::Serialize;
use tracing::info;

use crate::error::GatewayError;

pub mod document;
pub mod memory;
pub mod persistent;
pub mod relational;

pub use document::DocumentStore;
pub use memory::MemoryStore;
pub use persistent::PersistentStore;
pub use relational::RelationalStore;

/// 分析记录存储
///
/// 记录写入后不修改、不删除。ID 由具体后端分配。
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// 后端名称，用于健康检查和日志
    fn name(&self) -> &'static str;

    /// 持久化一条分析结果并返回带 ID 的记录
    async fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRecord, GatewayError>;

    /// 按时间倒序返回最近的记录，`None` 表示不限条数
    async fn recent(&self, limit: Option<usize>) -> Result<Vec<AnalysisRecord>, GatewayError>;

    async fn health_check(&self) -> StorageHealth;

    /// 关闭底层连接
    async fn close(&self);
}

// 存储层健康状态
#[derive(Debug, Clone, Serialize)]
pub struct StorageHealth {
    pub backend: &'static str,
    pub stores: BTreeMap<&'static str, bool>,
}

impl StorageHealth {
    pub fn new(backend: &'static str) -> Self {
        Self {
            backend,
            stores: BTreeMap::new(),
        }
    }

    pub fn with_store(mut self, store: &'static str, healthy: bool) -> Self {
        self.stores.insert(store, healthy);
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.stores.values().all(|healthy| *healthy)
    }
}

/// 按配置初始化存储后端
pub async fn connect(config: &AppConfig) -> Result<Arc<dyn AnalysisStore>> {
    let store: Arc<dyn AnalysisStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Persistent => Arc::new(PersistentStore::connect(config).await?),
    };

    info!("Storage backend initialized: {}", store.name());
    Ok(store)
}
