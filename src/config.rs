// 运行配置
//
// 所有配置项都来自环境变量（启动时先由 dotenv 加载 .env）

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::external::kinopoisk::DEFAULT_BASE_URL;
use crate::external::RetryPolicy;
use crate::models::validate_limit;
use crate::services::DEFAULT_PAGE_LIMIT;
use crate::storage::JsonFileStore;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// 应用配置
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub store_path: PathBuf,
    pub page_limit: u32,
    pub password: String,
    pub retry_delay: Duration,
    pub max_retries: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            store_path: PathBuf::from(JsonFileStore::DEFAULT_PATH),
            page_limit: DEFAULT_PAGE_LIMIT,
            password: String::new(),
            retry_delay: Duration::from_millis(1000),
            max_retries: 3,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取，缺省项使用默认值
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let page_limit = match get("CATALOG_PAGE_LIMIT") {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .and_then(|limit| validate_limit(limit).ok())
                .ok_or(ConfigError::InvalidValue {
                    key: "CATALOG_PAGE_LIMIT",
                    value: raw,
                })?,
            None => defaults.page_limit,
        };

        let retry_delay = match get("CATALOG_RETRY_DELAY_MS") {
            Some(raw) => Duration::from_millis(raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CATALOG_RETRY_DELAY_MS",
                value: raw.clone(),
            })?),
            None => defaults.retry_delay,
        };

        let max_retries = match get("CATALOG_MAX_RETRIES") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "CATALOG_MAX_RETRIES",
                value: raw.clone(),
            })?,
            None => defaults.max_retries,
        };

        Ok(Self {
            api_key: get("KINOPOISK_API_KEY").unwrap_or_default(),
            base_url: get("KINOPOISK_BASE_URL").unwrap_or(defaults.base_url),
            store_path: get("CATALOG_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            page_limit,
            // 口令允许为空，不做 trim 过滤
            password: lookup("CATALOG_PASSWORD").unwrap_or_default(),
            retry_delay,
            max_retries,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay: self.retry_delay,
        }
    }
}
