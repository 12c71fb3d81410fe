//! 片段库
//!
//! 用户手动维护的内容列表：新建的排在最前，编辑不改变位置与创建时间，
//! 永不自动淘汰。标题与内容在去除首尾空白后都不能为空。

use crate::error::AppError;
use crate::models::{new_item_id, now_millis, SnippetItem};
use crate::store::{PersistentStore, SnippetsKey};

#[derive(Debug, Default, Clone)]
pub struct SnippetStore {
    items: Vec<SnippetItem>,
}

fn trimmed_pair(title: &str, content: &str) -> Option<(String, String)> {
    let title = title.trim();
    let content = content.trim();
    if title.is_empty() || content.is_empty() {
        return None;
    }
    Some((title.to_string(), content.to_string()))
}

impl SnippetStore {
    pub fn load(store: &PersistentStore) -> Self {
        Self {
            items: store.get_seq::<SnippetsKey, _>(),
        }
    }

    /// 新增片段；任一字段为空时返回 `None` 且不改变状态
    pub fn add(&mut self, title: &str, content: &str) -> Option<SnippetItem> {
        let (title, content) = trimmed_pair(title, content)?;
        let item = SnippetItem {
            id: new_item_id(),
            title,
            content,
            created_at: now_millis(),
        };
        self.items.insert(0, item.clone());
        Some(item)
    }

    /// 原地更新标题与内容；未找到或输入为空时返回 `false`
    pub fn update(&mut self, id: &str, title: &str, content: &str) -> bool {
        let Some((title, content)) = trimmed_pair(title, content) else {
            return false;
        };
        match self.items.iter_mut().find(|s| s.id == id) {
            Some(item) => {
                item.title = title;
                item.content = content;
                true
            }
            None => false,
        }
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|s| s.id != id);
        self.items.len() != before
    }

    pub fn snapshot(&self) -> Vec<SnippetItem> {
        self.items.clone()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn persist(&self, store: &mut PersistentStore) -> Result<(), AppError> {
        store.set::<SnippetsKey>(&self.items)
    }
}
