use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

// 分析相关类型

/// `POST /api/analyze-product` 的请求体
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub product_text: String,
}

/// 分析管道返回的原始结果，结构由管道决定
pub type AnalysisResult = serde_json::Value;

/// 尚未分配 ID 的分析记录
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnalysis {
    pub product_text: String,
    pub result: AnalysisResult,
    pub timestamp: DateTime<Utc>,
}

impl NewAnalysis {
    pub fn new(product_text: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            product_text: product_text.into(),
            result,
            timestamp: Utc::now(),
        }
    }

    /// 由存储层分配 ID 后生成持久化记录
    pub fn into_record(self, id: impl Into<String>) -> AnalysisRecord {
        AnalysisRecord {
            id: id.into(),
            product_text: self.product_text,
            result: self.result,
            timestamp: self.timestamp,
        }
    }
}

/// 持久化的分析记录，写入后不再修改
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub product_text: String,
    pub result: AnalysisResult,
    pub timestamp: DateTime<Utc>,
}

// API 响应类型
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

// 配置相关类型
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub url: String,
    /// 0 表示不设超时
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Postgres + Redis
    Persistent,
    /// 进程内列表，重启后丢失
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub history_limit: Option<usize>,
}

impl StorageConfig {
    pub const DEFAULT_PERSISTENT_HISTORY_LIMIT: usize = 50;

    /// 历史记录条数上限；内存后端默认不限
    pub fn effective_history_limit(&self) -> Option<usize> {
        match (self.history_limit, self.backend) {
            (Some(limit), _) => Some(limit),
            (None, StorageBackend::Persistent) => Some(Self::DEFAULT_PERSISTENT_HISTORY_LIMIT),
            (None, StorageBackend::Memory) => None,
        }
    }
}
