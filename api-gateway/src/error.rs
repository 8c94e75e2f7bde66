use atlas_shared::ErrorResponse;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

/// 网关错误类型
///
/// 上游错误和存储错误对调用方表现一致：500 加错误信息。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Upstream(_) | GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// 返回给调用方的底层错误信息
    pub fn message(&self) -> &str {
        match self {
            GatewayError::Upstream(msg)
            | GatewayError::Storage(msg)
            | GatewayError::InvalidRequest(msg) => msg,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::Upstream(err.to_string())
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        GatewayError::Storage(err.to_string())
    }
}

impl From<redis::RedisError> for GatewayError {
    fn from(err: redis::RedisError) -> Self {
        GatewayError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Storage(err.to_string())
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::InvalidRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upstream_and_storage_share_response_shape() {
        for err in [
            GatewayError::Upstream("connection refused".to_string()),
            GatewayError::Storage("connection refused".to_string()),
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body, serde_json::json!({"error": "connection refused"}));
        }
    }

    #[test]
    fn test_invalid_request_is_client_error() {
        let err = GatewayError::InvalidRequest("missing field `productText`".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "missing field `productText`");
    }

    #[test]
    fn test_json_decode_failure_maps_to_storage() {
        let decode_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(GatewayError::from(decode_err), GatewayError::Storage(_)));
    }
}
