// JSON 文件键值存储
//
// 所有键值保存在同一个 JSON 对象文件中：
// - 启动时加载整个文件
// - 每次写入后整体落盘
// - 文件损坏时备份旧文件并从空存储开始

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use super::{KeyValueStore, StorageError};

/// JSON 文件键值存储
#[derive(Debug)]
pub struct JsonFileStore {
    /// 存储文件路径
    path: PathBuf,

    /// 内存中的全部键值（BTreeMap 保证落盘顺序稳定）
    entries: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// 默认存储文件路径
    pub const DEFAULT_PATH: &'static str = "catalog_store.json";

    /// 打开存储文件
    ///
    /// # 行为
    /// - 文件不存在：使用空存储，首次写入时创建文件
    /// - 文件损坏：备份为 `*.corrupted` 后使用空存储
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let entries = if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                    Ok(entries) => {
                        tracing::info!("成功加载本地存储: {:?} ({} 个键)", path, entries.len());
                        entries
                    }
                    Err(e) => {
                        tracing::warn!("本地存储文件损坏，使用空存储: {}", e);
                        Self::backup_corrupted(&path)?;
                        BTreeMap::new()
                    }
                },
                Err(e) => {
                    tracing::warn!("读取本地存储失败，使用空存储: {}", e);
                    BTreeMap::new()
                }
            }
        } else {
            tracing::info!("本地存储文件不存在，使用空存储: {:?}", path);
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_corrupted(path: &Path) -> Result<(), StorageError> {
        let backup = path.with_extension("json.corrupted");
        fs::rename(path, &backup)?;
        tracing::warn!("已备份损坏的存储文件: {:?}", backup);
        Ok(())
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, json)?;
        tracing::debug!("本地存储已写入: {:?}", self.path);
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| StorageError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().map_err(|_| StorageError::Poisoned)?;
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}
