// 集成测试共用的脚本化目录接口
//
// 每次调用都记录请求路径，响应（延迟 + 结果）由测试提供的闭包决定

#![allow(dead_code)]

use std::ops::Range;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use movie_catalog::external::query;
use movie_catalog::external::{ApiError, CatalogApi};
use movie_catalog::models::{
    FilterField, FilterOption, FilterSelection, MoviePage, MovieSummary, Studio, StudioPage,
};
use movie_catalog::services::CatalogBrowser;
use movie_catalog::storage::{KeyValueStore, MemoryStore};

type Responder = Box<dyn Fn(&str) -> (Duration, Result<MoviePage, ApiError>) + Send + Sync>;

pub struct ScriptedApi {
    calls: Mutex<Vec<String>>,
    responder: Responder,
}

impl ScriptedApi {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> (Duration, Result<MoviePage, ApiError>) + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            responder: Box::new(responder),
        }
    }

    /// 每页返回 `limit` 条、ID 按页码连续、共 `pages` 页
    pub fn paged(pages: u32, delay: Duration) -> Self {
        Self::new(move |path| {
            let page = param(path, "page").unwrap_or(1);
            let limit = param(path, "limit").unwrap_or(50);
            let docs = if page <= pages {
                let start = ((page - 1) * limit) as u64;
                movie_page(start..start + limit as u64, pages).docs
            } else {
                Vec::new()
            };
            (delay, Ok(MoviePage { docs, pages, ..Default::default() }))
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self, path: String) -> Result<MoviePage, ApiError> {
        let (delay, result) = (self.responder)(&path);
        self.calls.lock().unwrap().push(path);
        tokio::time::sleep(delay).await;
        result
    }
}

#[async_trait]
impl CatalogApi for ScriptedApi {
    async fn list_movies(
        &self,
        page: u32,
        limit: u32,
        filters: &FilterSelection,
    ) -> Result<MoviePage, ApiError> {
        self.respond(query::movie_list_path(page, limit, filters)).await
    }

    async fn search_movies(&self, page: u32, limit: u32, name: &str) -> Result<MoviePage, ApiError> {
        self.respond(query::movie_search_path(page, limit, name)).await
    }

    async fn movie_by_id(&self, id: u64) -> Result<MovieSummary, ApiError> {
        self.calls.lock().unwrap().push(query::movie_detail_path(id));
        Ok(movie(id))
    }

    async fn studios(&self, page: u32, limit: u32) -> Result<StudioPage, ApiError> {
        self.calls.lock().unwrap().push(query::studio_list_path(page, limit));
        Ok(StudioPage {
            docs: vec![Studio {
                title: Some("Мосфильм".to_string()),
                ..Default::default()
            }],
            pages: 1,
        })
    }

    async fn possible_values(&self, field: FilterField) -> Result<Vec<FilterOption>, ApiError> {
        self.calls.lock().unwrap().push(query::possible_values_path(field));
        Ok(vec![FilterOption {
            name: "драма".to_string(),
            slug: Some("drama".to_string()),
        }])
    }
}

pub fn movie(id: u64) -> MovieSummary {
    MovieSummary {
        id: Some(id),
        name: Some(format!("Movie {}", id)),
        year: Some(2000),
        ..Default::default()
    }
}

pub fn movie_page(ids: Range<u64>, pages: u32) -> MoviePage {
    MoviePage {
        docs: ids.map(movie).collect(),
        pages,
        ..Default::default()
    }
}

/// 从请求路径中取出数字参数
pub fn param(path: &str, name: &str) -> Option<u32> {
    let (_, query) = path.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .and_then(|(_, value)| value.parse().ok())
}

pub fn browser(api: ScriptedApi, limit: u32) -> CatalogBrowser<Arc<ScriptedApi>> {
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    CatalogBrowser::with_limit(Arc::new(api), store, limit)
}

pub fn ids(movies: &[MovieSummary]) -> Vec<u64> {
    movies.iter().filter_map(|m| m.id).collect()
}
