// 外部接口错误类型定义
//
// 区分可重试的临时不可用（503）与其它直接上抛的失败

use thiserror::Error;

/// 目录接口调用的统一错误类型
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Catalog API unavailable after {attempts} attempts (HTTP 503)")]
    Unavailable { attempts: u32 },

    #[error("Catalog API error: status {0}")]
    Status(u16),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Catalog API key not configured")]
    MissingApiKey,
}

impl ApiError {
    /// 是否为上游临时不可用
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ApiError::Unavailable { .. })
    }
}

// 实现从 reqwest::Error 到 ApiError 的转换
impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_status() {
            match err.status() {
                Some(status) => ApiError::Status(status.as_u16()),
                None => ApiError::Network(err.to_string()),
            }
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
