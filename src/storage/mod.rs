// 本地持久化存储
//
// 收藏和搜索历史都通过字符串键值对保存，存储后端可替换：
// - MemoryStore: 进程内存（测试、临时会话）
// - JsonFileStore: 单个 JSON 文件

pub mod file_store;
pub mod memory;

use std::sync::Arc;

use thiserror::Error;

pub use file_store::JsonFileStore;
pub use memory::MemoryStore;

/// 收藏列表的存储键
pub const FAVORITES_KEY: &str = "favoriteMovies";
/// 搜索历史的存储键
pub const SEARCH_HISTORY_KEY: &str = "searchHistory";

/// 存储操作错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("存储锁已失效")]
    Poisoned,
}

/// 字符串键值存储端口
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// 读取并解析 JSON 值
///
/// 键不存在、读取失败或内容损坏时返回 `T::default()`，只记录警告。
pub fn load_json_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("存储键 {} 内容损坏，使用空集合: {}", key, e);
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!("读取存储键 {} 失败，使用空集合: {}", key, e);
            T::default()
        }
    }
}

/// 序列化并写入 JSON 值
pub fn save_json<T: serde::Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}
