use crate::types::{
    AppConfig, DatabaseConfig, PipelineConfig, RedisConfig, ServerConfig, StorageBackend,
    StorageConfig,
};
use anyhow::Result;
use config::{Config, Environment, File};
use dotenvy::dotenv;
use std::collections::HashMap;
use std::env;

/// 旧版部署使用的扁平环境变量，优先级最高
const FLAT_ENV_OVERRIDES: &[(&str, &str)] = &[
    ("HOST", "server.host"),
    ("PORT", "server.port"),
    ("PIPELINE_URL", "pipeline.url"),
    ("PIPELINE_TIMEOUT_SECS", "pipeline.timeout_secs"),
    ("POSTGRES_HOST", "database.host"),
    ("POSTGRES_PORT", "database.port"),
    ("POSTGRES_DB", "database.name"),
    ("POSTGRES_USER", "database.user"),
    ("POSTGRES_PASSWORD", "database.password"),
    ("DB_MAX_CONNECTIONS", "database.max_connections"),
    ("REDIS_URL", "redis.url"),
    ("STORAGE_BACKEND", "storage.backend"),
    ("HISTORY_LIMIT", "storage.history_limit"),
];

pub fn load_config() -> Result<AppConfig> {
    // 加载 .env 文件
    dotenv().ok();

    build_config(env::vars().collect())
}

/// 按 默认值 → 配置文件 → APP__ 前缀变量 → 扁平变量 的顺序合并配置
pub fn build_config(vars: HashMap<String, String>) -> Result<AppConfig> {
    let env_name = vars
        .get("ENV")
        .cloned()
        .unwrap_or_else(|| "development".to_string());

    let mut builder = Config::builder()
        .add_source(Config::try_from(&AppConfig::default())?)
        // 添加默认配置文件
        .add_source(File::with_name("config/default").required(false))
        // 添加环境特定配置文件
        .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
        // 添加环境变量，使用 APP__ 前缀，例如 APP__SERVER__PORT
        .add_source(
            Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true)
                .source(Some(vars.clone().into_iter().collect())),
        );

    for (var, key) in FLAT_ENV_OVERRIDES {
        builder = builder.set_override_option(*key, vars.get(*var).cloned())?;
    }

    let config: AppConfig = builder.build()?.try_deserialize()?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &AppConfig) -> Result<()> {
    if config.server.port == 0 {
        return Err(anyhow::anyhow!("Server port cannot be 0"));
    }

    if config.pipeline.url.trim().is_empty() {
        return Err(anyhow::anyhow!("Pipeline URL cannot be empty"));
    }

    if config.database.name.trim().is_empty() {
        return Err(anyhow::anyhow!("Database name cannot be empty"));
    }

    if config.redis.url.trim().is_empty() {
        return Err(anyhow::anyhow!("Redis URL cannot be empty"));
    }

    Ok(())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3001,
            },
            pipeline: PipelineConfig {
                url: "http://localhost:8000".to_string(),
                timeout_secs: 0,
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                name: "atlas".to_string(),
                user: "user".to_string(),
                password: "password".to_string(),
                max_connections: 10,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Persistent,
                history_limit: None,
            },
        }
    }
}
