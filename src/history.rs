//! 剪贴板历史
//!
//! 有界（100 条）、按内容去重、最新在前的历史列表。
//! 本模块只负责列表本身的规则；落盘与广播由 [`crate::agent::AgentCore`] 编排。

use crate::error::AppError;
use crate::models::{new_item_id, now_millis, HistoryItem};
use crate::store::{HistoryKey, PersistentStore};

/// 历史条目上限
pub const HISTORY_LIMIT: usize = 100;

#[derive(Debug, Default, Clone)]
pub struct HistoryStore {
    items: Vec<HistoryItem>,
}

impl HistoryStore {
    /// 从持久化存储恢复
    ///
    /// 旧数据可能不满足当前不变量（重复内容、超长、空内容），加载时一并收敛。
    pub fn load(store: &PersistentStore) -> Self {
        let mut items: Vec<HistoryItem> = Vec::new();
        for item in store.get_seq::<HistoryKey, _>() {
            if item.content.is_empty() || items.iter().any(|h| h.content == item.content) {
                continue;
            }
            items.push(item);
        }
        items.truncate(HISTORY_LIMIT);
        Self { items }
    }

    /// 记录一次捕获
    ///
    /// 空内容直接忽略；已有相同内容的条目被移除，新条目以新的标识与时间戳放到最前。
    pub fn record(&mut self, content: &str) -> Option<HistoryItem> {
        if content.is_empty() {
            return None;
        }

        // 毫秒精度下连续两次捕获可能同一时刻，保持时间戳严格递增
        let captured_at = match self.items.first() {
            Some(newest) => now_millis().max(newest.captured_at + 1),
            None => now_millis(),
        };

        let item = HistoryItem {
            id: new_item_id(),
            content: content.to_string(),
            captured_at,
        };

        self.items.retain(|h| h.content != content);
        self.items.insert(0, item.clone());
        self.items.truncate(HISTORY_LIMIT);

        Some(item)
    }

    /// 按标识删除；返回是否真的删除了条目
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|h| h.id != id);
        self.items.len() != before
    }

    /// 清空全部历史；返回清空前是否有内容
    pub fn clear(&mut self) -> bool {
        let had_items = !self.items.is_empty();
        self.items.clear();
        had_items
    }

    /// 最新在前的只读快照
    pub fn snapshot(&self) -> Vec<HistoryItem> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn persist(&self, store: &mut PersistentStore) -> Result<(), AppError> {
        store.set::<HistoryKey>(&self.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;

    fn contents(store: &HistoryStore) -> Vec<String> {
        store.snapshot().into_iter().map(|h| h.content).collect()
    }

    #[test]
    fn empty_content_is_ignored() {
        let mut history = HistoryStore::default();
        assert!(history.record("").is_none());
        assert!(history.is_empty());
    }

    #[test]
    fn recapture_moves_to_front_with_new_identity() {
        let mut history = HistoryStore::default();
        let first = history.record("a").unwrap();
        history.record("b").unwrap();
        let again = history.record("a").unwrap();

        assert_eq!(contents(&history), vec!["a", "b"]);
        assert_ne!(first.id, again.id);
        assert!(again.captured_at > first.captured_at);
        let b = &history.snapshot()[1];
        assert!(again.captured_at > b.captured_at);
    }

    #[test]
    fn immediate_duplicate_keeps_length() {
        let mut history = HistoryStore::default();
        history.record("x").unwrap();
        let before = history.snapshot()[0].clone();
        history.record("x").unwrap();

        assert_eq!(history.len(), 1);
        let after = &history.snapshot()[0];
        assert_ne!(after.id, before.id);
        assert!(after.captured_at > before.captured_at);
    }

    #[test]
    fn oldest_item_is_evicted_past_limit() {
        let mut history = HistoryStore::default();
        for i in 0..=HISTORY_LIMIT {
            history.record(&format!("clip-{i}"));
        }

        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history.snapshot()[0].content, format!("clip-{HISTORY_LIMIT}"));
        assert!(!contents(&history).contains(&"clip-0".to_string()));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut history = HistoryStore::default();
        let item = history.record("gone").unwrap();
        history.record("kept").unwrap();

        assert!(history.delete(&item.id));
        assert!(!history.delete(&item.id));
        assert_eq!(contents(&history), vec!["kept"]);
    }

    #[test]
    fn clear_reports_previous_state() {
        let mut history = HistoryStore::default();
        assert!(!history.clear());
        history.record("a");
        assert!(history.clear());
        assert!(history.is_empty());
    }

    #[test]
    fn load_keeps_valid_items_next_to_broken_one() {
        let backend = MemoryBackend::new();
        backend.insert_raw(
            "history",
            r#"[{"id":"1","content":"keep me","capturedAt":1},{"id":"2","content":"x"}]"#,
        );
        let store = PersistentStore::open(backend);

        let history = HistoryStore::load(&store);
        assert_eq!(contents(&history), vec!["keep me"]);
    }

    #[test]
    fn load_normalizes_legacy_data() {
        let backend = MemoryBackend::new();
        backend.insert_raw(
            "history",
            r#"[
                {"id":"1","content":"dup","timestamp":3,"type":"text"},
                {"id":"2","content":"","timestamp":2,"type":"text"},
                {"id":"3","content":"dup","timestamp":1,"type":"text"}
            ]"#,
        );
        let store = PersistentStore::open(backend);

        let history = HistoryStore::load(&store);
        assert_eq!(history.len(), 1);
        assert_eq!(history.snapshot()[0].id, "1");
    }
}
