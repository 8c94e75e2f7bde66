use async_trait::async_trait;
use atlas_shared::{generate_uuid, AnalysisRecord, NewAnalysis};
use tokio::sync::RwLock;
use tracing::debug;

use super::{AnalysisStore, StorageHealth};
use crate::error::GatewayError;

/// 进程内存储，进程重启后数据丢失
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<AnalysisRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl AnalysisStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, analysis: NewAnalysis) -> Result<AnalysisRecord, GatewayError> {
        let record = analysis.into_record(generate_uuid());
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn recent(&self, limit: Option<usize>) -> Result<Vec<AnalysisRecord>, GatewayError> {
        let records = self.records.read().await;

        // 时间相同的记录保持后写入的在前
        let mut newest_first: Vec<AnalysisRecord> = records.iter().rev().cloned().collect();
        newest_first.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(limit) = limit {
            newest_first.truncate(limit);
        }
        Ok(newest_first)
    }

    async fn health_check(&self) -> StorageHealth {
        StorageHealth::new(self.name()).with_store("memory", true)
    }

    async fn close(&self) {
        debug!("Memory store closed with {} records", self.len().await);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn analysis_at(text: &str, offset_secs: i64) -> NewAnalysis {
        NewAnalysis {
            product_text: text.to_string(),
            result: json!({"text": text}),
            timestamp: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_unique_ids() {
        let store = MemoryStore::new();
        let first = store.insert(analysis_at("a", 0)).await.unwrap();
        let second = store.insert(analysis_at("b", 0)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first() {
        let store = MemoryStore::new();
        // 故意乱序写入
        store.insert(analysis_at("middle", -10)).await.unwrap();
        store.insert(analysis_at("newest", 0)).await.unwrap();
        store.insert(analysis_at("oldest", -20)).await.unwrap();

        let records = store.recent(None).await.unwrap();
        let texts: Vec<&str> = records.iter().map(|r| r.product_text.as_str()).collect();
        assert_eq!(texts, vec!["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_recent_unbounded_by_default_and_limited_on_request() {
        let store = MemoryStore::new();
        for i in 0..60 {
            store.insert(analysis_at(&format!("p{}", i), i)).await.unwrap();
        }

        assert_eq!(store.recent(None).await.unwrap().len(), 60);

        let limited = store.recent(Some(50)).await.unwrap();
        assert_eq!(limited.len(), 50);
        assert_eq!(limited[0].product_text, "p59");
        assert!(limited.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_completion_order() {
        let store = MemoryStore::new();
        let ts = Utc::now();
        for text in ["first", "second"] {
            store
                .insert(NewAnalysis {
                    product_text: text.to_string(),
                    result: json!({}),
                    timestamp: ts,
                })
                .await
                .unwrap();
        }

        let records = store.recent(None).await.unwrap();
        assert_eq!(records[0].product_text, "second");
        assert_eq!(records[1].product_text, "first");
    }
}
