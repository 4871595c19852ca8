use std::sync::Arc;

use crate::models::MovieSummary;
use crate::storage::{load_json_or_default, save_json, KeyValueStore, StorageError, FAVORITES_KEY};

/// 收藏夹
///
/// 以电影 ID 为键的集合，每次修改后整体写回本地存储。
pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    favorites: Vec<MovieSummary>,
}

impl FavoritesStore {
    /// 从本地存储加载收藏，内容损坏时从空集合开始
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let saved: Vec<MovieSummary> = load_json_or_default(store.as_ref(), FAVORITES_KEY);
        // 旧数据里可能混入没有 ID 或重复的条目
        let mut favorites: Vec<MovieSummary> = Vec::with_capacity(saved.len());
        for movie in saved {
            if movie.id.is_some() && !favorites.iter().any(|f| f.id == movie.id) {
                favorites.push(movie);
            }
        }
        tracing::debug!("Loaded {} favorite movies", favorites.len());
        Self { store, favorites }
    }

    /// 切换收藏状态，返回切换后是否处于收藏中
    ///
    /// 没有 ID 的条目无法作为键，保持原状并返回 `false`。
    pub fn toggle(&mut self, movie: &MovieSummary) -> Result<bool, StorageError> {
        let Some(id) = movie.id else {
            tracing::warn!("Ignoring favorite toggle for movie without id: {}", movie.display_name());
            return Ok(false);
        };

        let mut updated = self.favorites.clone();
        let now_favorite = if let Some(pos) = updated.iter().position(|f| f.id == Some(id)) {
            updated.remove(pos);
            false
        } else {
            updated.push(movie.clone());
            true
        };

        self.persist(updated)?;
        tracing::info!(
            "{} favorite: {} ({})",
            if now_favorite { "Added" } else { "Removed" },
            movie.display_name(),
            id
        );
        Ok(now_favorite)
    }

    /// 按 ID 移除，不存在时返回 `false`
    pub fn remove(&mut self, id: u64) -> Result<bool, StorageError> {
        if !self.is_favorite(id) {
            return Ok(false);
        }
        let updated = self
            .favorites
            .iter()
            .filter(|f| f.id != Some(id))
            .cloned()
            .collect();
        self.persist(updated)?;
        Ok(true)
    }

    pub fn is_favorite(&self, id: u64) -> bool {
        self.favorites.iter().any(|f| f.id == Some(id))
    }

    pub fn get(&self, id: u64) -> Option<&MovieSummary> {
        self.favorites.iter().find(|f| f.id == Some(id))
    }

    pub fn get_all(&self) -> &[MovieSummary] {
        &self.favorites
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// 清空收藏并删除持久化数据
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(FAVORITES_KEY)?;
        self.favorites.clear();
        Ok(())
    }

    fn persist(&mut self, updated: Vec<MovieSummary>) -> Result<(), StorageError> {
        save_json(self.store.as_ref(), FAVORITES_KEY, &updated)?;
        self.favorites = updated;
        Ok(())
    }
}
