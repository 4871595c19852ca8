use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};

use crate::models::{FilterField, FilterOption, MovieSummary};

/// 按写入时间过期的表，过期条目读不到，等清理任务移除
#[derive(Debug)]
struct TtlMap<K, V> {
    entries: RwLock<HashMap<K, (V, Instant)>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn fresh(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().ok()?;
        let (value, stored_at) = entries.get(key)?;
        if stored_at.elapsed() > self.ttl {
            return None;
        }
        Some(value.clone())
    }

    fn insert(&self, key: K, value: V) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, (value, Instant::now()));
        }
    }

    /// 返回移除的条目数
    fn purge(&self, expired_only: bool) -> usize {
        let Ok(mut entries) = self.entries.write() else {
            return 0;
        };
        let before = entries.len();
        if expired_only {
            let ttl = self.ttl;
            entries.retain(|_, (_, stored_at)| stored_at.elapsed() <= ttl);
        } else {
            entries.clear();
        }
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

/// 目录接口响应缓存
///
/// 只缓存详情和筛选候选值；列表与搜索分页每次都走网络。
#[derive(Debug, Clone)]
pub struct CatalogCache {
    details: Arc<TtlMap<u64, MovieSummary>>,
    options: Arc<TtlMap<FilterField, Vec<FilterOption>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        // 详情2小时，候选值1小时
        Self::with_ttls(Duration::from_secs(2 * 60 * 60), Duration::from_secs(60 * 60))
    }

    pub fn with_ttls(details_ttl: Duration, options_ttl: Duration) -> Self {
        Self {
            details: Arc::new(TtlMap::new(details_ttl)),
            options: Arc::new(TtlMap::new(options_ttl)),
        }
    }

    pub fn get_details(&self, id: u64) -> Option<MovieSummary> {
        self.details.fresh(&id)
    }

    pub fn set_details(&self, id: u64, details: MovieSummary) {
        self.details.insert(id, details);
    }

    pub fn get_options(&self, field: FilterField) -> Option<Vec<FilterOption>> {
        self.options.fresh(&field)
    }

    pub fn set_options(&self, field: FilterField, options: Vec<FilterOption>) {
        self.options.insert(field, options);
    }

    /// 清理过期缓存，返回移除的条目数
    pub fn cleanup_expired(&self) -> usize {
        self.details.purge(true) + self.options.purge(true)
    }

    /// 清空所有缓存
    pub fn clear_all(&self) {
        self.details.purge(false);
        self.options.purge(false);
    }

    pub fn get_stats(&self) -> CacheStats {
        CacheStats {
            details_cache_size: self.details.len(),
            options_cache_size: self.options.len(),
        }
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub details_cache_size: usize,
    pub options_cache_size: usize,
}

/// 缓存清理任务
pub struct CacheCleanupTask {
    cache: CatalogCache,
    interval: Duration,
}

impl CacheCleanupTask {
    pub fn new(cache: CatalogCache, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// 启动定期清理任务
    pub async fn start(self) {
        let mut interval = tokio::time::interval(self.interval);

        loop {
            interval.tick().await;
            let removed = self.cache.cleanup_expired();
            tracing::debug!(
                "Cache cleanup removed {} entries. Stats: {:?}",
                removed,
                self.cache.get_stats()
            );
        }
    }
}
