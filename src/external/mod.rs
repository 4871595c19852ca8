pub mod cache;
pub mod error;
pub mod kinopoisk;
pub mod query;

use std::sync::Arc;

use async_trait::async_trait;

pub use cache::{CacheCleanupTask, CacheStats, CatalogCache};
pub use error::ApiError;
pub use kinopoisk::{KinopoiskClient, RetryPolicy};

use crate::models::{FilterField, FilterOption, FilterSelection, MoviePage, MovieSummary, StudioPage};

/// 远程电影目录（只读）
///
/// 浏览核心和前端都只依赖这个 trait，测试中用脚本化的实现替换。
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// `GET /movie?...` 按筛选条件分页列出
    async fn list_movies(
        &self,
        page: u32,
        limit: u32,
        filters: &FilterSelection,
    ) -> Result<MoviePage, ApiError>;

    /// `GET /movie/search?...` 按名称分页搜索
    async fn search_movies(&self, page: u32, limit: u32, name: &str) -> Result<MoviePage, ApiError>;

    async fn movie_by_id(&self, id: u64) -> Result<MovieSummary, ApiError>;

    async fn studios(&self, page: u32, limit: u32) -> Result<StudioPage, ApiError>;

    async fn possible_values(&self, field: FilterField) -> Result<Vec<FilterOption>, ApiError>;
}

#[async_trait]
impl<A: CatalogApi + ?Sized> CatalogApi for Arc<A> {
    async fn list_movies(
        &self,
        page: u32,
        limit: u32,
        filters: &FilterSelection,
    ) -> Result<MoviePage, ApiError> {
        (**self).list_movies(page, limit, filters).await
    }

    async fn search_movies(&self, page: u32, limit: u32, name: &str) -> Result<MoviePage, ApiError> {
        (**self).search_movies(page, limit, name).await
    }

    async fn movie_by_id(&self, id: u64) -> Result<MovieSummary, ApiError> {
        (**self).movie_by_id(id).await
    }

    async fn studios(&self, page: u32, limit: u32) -> Result<StudioPage, ApiError> {
        (**self).studios(page, limit).await
    }

    async fn possible_values(&self, field: FilterField) -> Result<Vec<FilterOption>, ApiError> {
        (**self).possible_values(field).await
    }
}

/// 带缓存的目录客户端
#[derive(Clone)]
pub struct CachedCatalog<A> {
    inner: A,
    pub cache: CatalogCache,
}

impl<A: CatalogApi> CachedCatalog<A> {
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            cache: CatalogCache::new(),
        }
    }

    /// 获取缓存统计信息
    pub fn get_cache_stats(&self) -> CacheStats {
        self.cache.get_stats()
    }

    /// 清空所有缓存
    pub fn clear_cache(&self) {
        self.cache.clear_all();
    }
}

#[async_trait]
impl<A: CatalogApi> CatalogApi for CachedCatalog<A> {
    async fn list_movies(
        &self,
        page: u32,
        limit: u32,
        filters: &FilterSelection,
    ) -> Result<MoviePage, ApiError> {
        self.inner.list_movies(page, limit, filters).await
    }

    async fn search_movies(&self, page: u32, limit: u32, name: &str) -> Result<MoviePage, ApiError> {
        self.inner.search_movies(page, limit, name).await
    }

    /// 获取电影详情（带缓存）
    async fn movie_by_id(&self, id: u64) -> Result<MovieSummary, ApiError> {
        if let Some(cached) = self.cache.get_details(id) {
            tracing::debug!("Cache hit for movie details: {}", id);
            return Ok(cached);
        }

        let movie = self.inner.movie_by_id(id).await?;
        self.cache.set_details(id, movie.clone());
        tracing::debug!("Cached movie details: {}", id);
        Ok(movie)
    }

    async fn studios(&self, page: u32, limit: u32) -> Result<StudioPage, ApiError> {
        self.inner.studios(page, limit).await
    }

    /// 获取筛选候选值（带缓存）
    async fn possible_values(&self, field: FilterField) -> Result<Vec<FilterOption>, ApiError> {
        if let Some(cached) = self.cache.get_options(field) {
            tracing::debug!("Cache hit for possible values: {}", field);
            return Ok(cached);
        }

        let options = self.inner.possible_values(field).await?;
        self.cache.set_options(field, options.clone());
        tracing::debug!("Cached possible values: {} ({} entries)", field, options.len());
        Ok(options)
    }
}
