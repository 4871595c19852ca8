use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::query;
use super::CatalogApi;
use crate::models::{FilterField, FilterOption, FilterSelection, MoviePage, MovieSummary, StudioPage};

pub const DEFAULT_BASE_URL: &str = "https://api.kinopoisk.dev/v1.4";
pub const API_KEY_HEADER: &str = "X-API-KEY";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// 503 重试策略：固定间隔，有限次数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Kinopoisk 目录接口客户端
#[derive(Clone)]
pub struct KinopoiskClient {
    client: Client,
    api_key: String,
    base_url: String,
    /// 候选值接口只存在于 v1
    options_base_url: String,
    retry: RetryPolicy,
}

impl KinopoiskClient {
    pub fn new(api_key: String) -> Result<Self, ApiError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self, ApiError> {
        if api_key.trim().is_empty() {
            return Err(ApiError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        let options_base_url = base_url.replace("v1.4", "v1");

        Ok(Self {
            client,
            api_key,
            base_url,
            options_base_url,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// 发送 GET 请求并解析 JSON
    ///
    /// 503 时按固定间隔重试，最多 `max_retries` 次；其它失败直接返回。
    async fn get_json<T: DeserializeOwned>(&self, base: &str, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", base, path);
        let mut retries = 0;

        loop {
            tracing::debug!("GET {} (retry {})", url, retries);

            let response = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, &self.api_key)
                .send()
                .await?;

            let status = response.status();
            if status == StatusCode::SERVICE_UNAVAILABLE {
                if retries < self.retry.max_retries {
                    retries += 1;
                    tracing::warn!(
                        "Catalog API returned 503 for {}, retrying in {:?} ({}/{})",
                        path,
                        self.retry.delay,
                        retries,
                        self.retry.max_retries
                    );
                    tokio::time::sleep(self.retry.delay).await;
                    continue;
                }
                return Err(ApiError::Unavailable {
                    attempts: retries + 1,
                });
            }

            if !status.is_success() {
                tracing::warn!("Catalog API error for {}: {}", path, status);
                return Err(ApiError::Status(status.as_u16()));
            }

            let body = response.bytes().await?;
            return Ok(serde_json::from_slice(&body)?);
        }
    }
}

#[async_trait]
impl CatalogApi for KinopoiskClient {
    async fn list_movies(
        &self,
        page: u32,
        limit: u32,
        filters: &FilterSelection,
    ) -> Result<MoviePage, ApiError> {
        let path = query::movie_list_path(page, limit, filters);
        self.get_json(&self.base_url, &path).await
    }

    async fn search_movies(&self, page: u32, limit: u32, name: &str) -> Result<MoviePage, ApiError> {
        let path = query::movie_search_path(page, limit, name);
        self.get_json(&self.base_url, &path).await
    }

    async fn movie_by_id(&self, id: u64) -> Result<MovieSummary, ApiError> {
        self.get_json(&self.base_url, &query::movie_detail_path(id)).await
    }

    async fn studios(&self, page: u32, limit: u32) -> Result<StudioPage, ApiError> {
        self.get_json(&self.base_url, &query::studio_list_path(page, limit))
            .await
    }

    async fn possible_values(&self, field: FilterField) -> Result<Vec<FilterOption>, ApiError> {
        self.get_json(&self.options_base_url, &query::possible_values_path(field))
            .await
    }
}
