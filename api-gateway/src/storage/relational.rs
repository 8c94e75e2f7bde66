use std::time::Duration;

use anyhow::Result;
use atlas_shared::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{error, info};

use crate::error::GatewayError;

/// 网关写入的交互记录固定使用的用户和类型
pub const SYSTEM_USER_ID: &str = "system";
pub const ANALYSIS_INTERACTION: &str = "analysis";

/// Postgres 连接池，负责 user_interactions 表
#[derive(Clone)]
pub struct RelationalStore {
    pool: PgPool,
}

impl RelationalStore {
    /// 创建新的数据库连接池
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!(
            "Connecting to database: {}:{}/{}",
            config.host, config.port, config.name
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.connection_url())
            .await?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// 获取连接池
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 写入一条分析交互记录，返回生成的 ID
    pub async fn record_analysis(&self) -> Result<i64, GatewayError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO user_interactions (user_id, interaction_type) VALUES ($1, $2) RETURNING id::BIGINT",
        )
        .bind(SYSTEM_USER_ID)
        .bind(ANALYSIS_INTERACTION)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// 删除交互记录，用于文档写入失败后的补偿
    pub async fn delete_interaction(&self, id: i64) -> Result<bool, GatewayError> {
        let result = sqlx::query("DELETE FROM user_interactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 健康检查
    pub async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                error!("Database health check failed: {}", e);
                false
            }
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database connection pool closed");
    }
}
