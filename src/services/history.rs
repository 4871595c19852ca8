use std::sync::Arc;

use crate::storage::{load_json_or_default, save_json, KeyValueStore, StorageError, SEARCH_HISTORY_KEY};

/// 搜索历史最多保留的条数
pub const MAX_HISTORY_ENTRIES: usize = 20;

/// 搜索历史（最近的在前，按原文去重）
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    entries: Vec<String>,
}

impl SearchHistory {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let mut entries: Vec<String> = load_json_or_default(store.as_ref(), SEARCH_HISTORY_KEY);
        entries.truncate(MAX_HISTORY_ENTRIES);
        Self { store, entries }
    }

    /// 记录一次搜索：移到最前、去重、截断到上限
    ///
    /// 空白搜索词不记录。
    pub fn record(&mut self, query: &str) -> Result<(), StorageError> {
        if query.trim().is_empty() {
            return Ok(());
        }

        let mut updated = Vec::with_capacity(self.entries.len() + 1);
        updated.push(query.to_string());
        updated.extend(self.entries.iter().filter(|e| e.as_str() != query).cloned());
        updated.truncate(MAX_HISTORY_ENTRIES);

        self.persist(updated)
    }

    pub fn remove(&mut self, query: &str) -> Result<bool, StorageError> {
        if !self.entries.iter().any(|e| e == query) {
            return Ok(false);
        }
        let updated = self.entries.iter().filter(|e| e.as_str() != query).cloned().collect();
        self.persist(updated)?;
        Ok(true)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(SEARCH_HISTORY_KEY)?;
        self.entries.clear();
        Ok(())
    }

    fn persist(&mut self, updated: Vec<String>) -> Result<(), StorageError> {
        save_json(self.store.as_ref(), SEARCH_HISTORY_KEY, &updated)?;
        self.entries = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use proptest::prelude::*;

    fn history() -> SearchHistory {
        SearchHistory::load(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_most_recent_first_and_deduplicated() {
        let mut history = history();
        history.record("matrix").unwrap();
        history.record("alien").unwrap();
        history.record("matrix").unwrap();

        assert_eq!(history.entries(), ["matrix".to_string(), "alien".to_string()]);
    }

    #[test]
    fn test_capped_at_twenty() {
        let mut history = history();
        for i in 0..25 {
            history.record(&format!("query {}", i)).unwrap();
        }
        assert_eq!(history.entries().len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.entries()[0], "query 24");
        assert_eq!(history.entries()[19], "query 5");
    }

    #[test]
    fn test_blank_queries_are_skipped() {
        let mut history = history();
        history.record("").unwrap();
        history.record("   ").unwrap();
        assert!(history.entries().is_empty());
    }

    #[test]
    fn test_persisted_and_reloaded() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        {
            let mut history = SearchHistory::load(kv.clone());
            history.record("солярис").unwrap();
            history.record("сталкер").unwrap();
        }
        let reloaded = SearchHistory::load(kv.clone());
        assert_eq!(reloaded.entries(), ["сталкер".to_string(), "солярис".to_string()]);

        kv.set(SEARCH_HISTORY_KEY, "not json").unwrap();
        assert!(SearchHistory::load(kv).entries().is_empty());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut history = history();
        history.record("a").unwrap();
        history.record("b").unwrap();
        assert!(history.remove("a").unwrap());
        assert!(!history.remove("a").unwrap());
        assert_eq!(history.entries(), ["b".to_string()]);

        history.clear().unwrap();
        assert!(history.entries().is_empty());
    }

    proptest! {
        #[test]
        fn prop_history_is_bounded_and_unique(queries in prop::collection::vec("[a-c]{1,2}", 0..60)) {
            let mut history = history();
            for q in &queries {
                history.record(q).unwrap();
                prop_assert_eq!(history.entries().first(), Some(q));
            }
            let entries = history.entries();
            prop_assert!(entries.len() <= MAX_HISTORY_ENTRIES);
            let mut unique = entries.to_vec();
            unique.sort();
            unique.dedup();
            prop_assert_eq!(unique.len(), entries.len());
        }
    }
}
