use anyhow::Result;
use async_trait::async_trait;
use atlas_shared::{AnalysisRecord, AppConfig, NewAnalysis};
use tracing::{error, info, warn};

use super::document::index_precision;
use super::{AnalysisStore, DocumentStore, RelationalStore, StorageHealth};
use crate::error::GatewayError;
use crate::schema;

/// 生成分析 ID 的交互日志表
#[async_trait]
pub trait InteractionLog: Send + Sync {
    async fn record_analysis(&self) -> Result<i64, GatewayError>;
    async fn delete_interaction(&self, id: i64) -> Result<bool, GatewayError>;
    async fn health_check(&self) -> bool;
    async fn close(&self);
}

/// 保存完整记录并维护时间索引
#[async_trait]
pub trait AnalysisDocuments: Send + Sync {
    async fn insert(&self, record: &AnalysisRecord) -> Result<(), GatewayError>;
    async fn recent(&self, limit: Option<usize>) -> Result<Vec<AnalysisRecord>, GatewayError>;
    async fn health_check(&self) -> bool;
}

#[async_trait]
impl InteractionLog for RelationalStore {
    async fn record_analysis(&self) -> Result<i64, GatewayError> {
        RelationalStore::record_analysis(self).await
    }

    async fn delete_interaction(&self, id: i64) -> Result<bool, GatewayError> {
        RelationalStore::delete_interaction(self, id).await
    }

    async fn health_check(&self) -> bool {
        RelationalStore::health_check(self).await
    }

    async fn close(&self) {
        RelationalStore::close(self).await
    }
}

#[async_trait]
impl AnalysisDocuments for DocumentStore {
    async fn insert(&self, record: &AnalysisRecord) -> Result<(), GatewayError> {
        DocumentStore::insert(self, record).await
    }

    async fn recent(&self, limit: Option<usize>) -> Result<Vec<AnalysisRecord>, GatewayError> {
        DocumentStore::recent(self, limit).await
    }

    async fn health_check(&self) -> bool {
        DocumentStore::health_check(self).await
    }
}

/// Postgres 生成 ID，Redis 保存完整记录
///
/// 文档键使用关系库 ID，所以必须先写 Postgres 再写 Redis。
/// 文档写入失败时删除刚插入的交互记录。
pub struct PersistentStore<R = RelationalStore, D = DocumentStore> {
    relational: R,
    documents: D,
}

impl PersistentStore {
    /// 初始化存储层
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let relational = RelationalStore::connect(&config.database).await?;

        // 运行数据库迁移
        if let Err(e) = schema::ensure_gateway_schema(relational.pool()).await {
            warn!("Database migrations failed: {}", e);
        }

        let documents = DocumentStore::connect(&config.redis.url).await?;

        Ok(Self::new(relational, documents))
    }
}

impl<R: InteractionLog, D: AnalysisDocuments> PersistentStore<R, D> {
    pub fn new(relational: R, documents: D) -> Self {
        Self {
            relational,
            documents,
        }
    }
}

#[async_trait]
impl<R: InteractionLog, D: AnalysisDocuments> AnalysisStore for PersistentStore<R, D> {
    fn name(&self) -> &'static str {
        "persistent"
    }

    async fn insert(&self, mut analysis: NewAnalysis) -> Result<AnalysisRecord, GatewayError> {
        // 文档里的时间与索引 score 同为毫秒精度，同一毫秒内的记录才不会乱序
        analysis.timestamp = index_precision(analysis.timestamp);

        let id = self.relational.record_analysis().await?;
        let record = analysis.into_record(id.to_string());

        if let Err(e) = self.documents.insert(&record).await {
            match self.relational.delete_interaction(id).await {
                Ok(_) => warn!("Document write for analysis {} failed, interaction row removed", id),
                Err(cleanup) => error!(
                    "Document write for analysis {} failed and interaction row could not be removed: {}",
                    id, cleanup
                ),
            }
            return Err(e);
        }

        Ok(record)
    }

    async fn recent(&self, limit: Option<usize>) -> Result<Vec<AnalysisRecord>, GatewayError> {
        self.documents.recent(limit).await
    }

    async fn health_check(&self) -> StorageHealth {
        StorageHealth::new(self.name())
            .with_store("relational", self.relational.health_check().await)
            .with_store("document", self.documents.health_check().await)
    }

    async fn close(&self) {
        self.relational.close().await;
        // Redis 多路复用连接没有显式关闭，随存储一起释放
        info!("Document store connection released");
        info!("Persistent store closed");
    }
}
