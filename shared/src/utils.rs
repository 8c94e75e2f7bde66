use chrono::{DateTime, Utc};
use uuid::Uuid;

// UUID 生成工具函数
pub fn generate_uuid() -> String {
    Uuid::new_v4().to_string()
}

// 时间工具函数
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

// 字符串工具函数，按字符截断，日志里用
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
