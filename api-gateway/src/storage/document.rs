use anyhow::Result;
use atlas_shared::AnalysisRecord;
use chrono::{DateTime, SubsecRound, Utc};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client as RedisClient};
use tracing::{error, info, warn};

use crate::error::GatewayError;

/// 按时间排序的分析记录 ID 集合，score 为毫秒时间戳
pub const ANALYSES_INDEX_KEY: &str = "atlas:analyses";

/// 单条分析记录的文档键
pub fn analysis_key(id: &str) -> String {
    format!("atlas:analysis:{}", id)
}

/// 截到毫秒，与索引 score 精度一致
pub fn index_precision(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp.trunc_subsecs(3)
}

/// ZREVRANGE 的结束下标，`None` 表示取到末尾
fn range_stop(limit: Option<usize>) -> Option<isize> {
    match limit {
        Some(0) => None,
        Some(n) => Some(isize::try_from(n).map_or(-1, |n| n - 1)),
        None => Some(-1),
    }
}

/// Redis 文档存储
#[derive(Clone)]
pub struct DocumentStore {
    connection: MultiplexedConnection,
}

impl DocumentStore {
    /// 创建新的文档存储连接
    pub async fn connect(redis_url: &str) -> Result<Self> {
        info!("Connecting to Redis document store");

        let client = RedisClient::open(redis_url)?;
        let mut connection = client.get_multiplexed_async_connection().await?;

        // 测试连接
        let _: String = redis::cmd("PING").query_async(&mut connection).await?;

        info!("Redis connection established successfully");

        Ok(Self { connection })
    }

    /// 写入文档并加入时间索引，两步在同一个事务里
    pub async fn insert(&self, record: &AnalysisRecord) -> Result<(), GatewayError> {
        let document = serde_json::to_string(record)?;
        let mut conn = self.connection.clone();

        redis::pipe()
            .atomic()
            .set(analysis_key(&record.id), document)
            .ignore()
            .zadd(ANALYSES_INDEX_KEY, &record.id, record.timestamp.timestamp_millis())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    /// 按时间倒序读取最近的记录
    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<AnalysisRecord>, GatewayError> {
        let Some(stop) = range_stop(limit) else {
            return Ok(Vec::new());
        };

        let mut conn = self.connection.clone();
        let ids: Vec<String> = conn.zrevrange(ANALYSES_INDEX_KEY, 0, stop).await?;
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| analysis_key(id)).collect();
        let documents: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let mut records = Vec::with_capacity(documents.len());
        for (id, document) in ids.iter().zip(documents) {
            match document {
                Some(json) => records.push(serde_json::from_str(&json)?),
                None => warn!("Analysis {} is indexed but its document is missing", id),
            }
        }
        Ok(records)
    }

    /// 健康检查
    pub async fn health_check(&self) -> bool {
        let mut conn = self.connection.clone();
        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(response) if response == "PONG" => true,
            Ok(response) => {
                warn!("Redis health check: unexpected response {}", response);
                false
            }
            Err(e) => {
                error!("Redis health check failed: {}", e);
                false
            }
        }
    }
}
