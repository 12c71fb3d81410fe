//! 类型化持久存储
//!
//! # 设计思路
//!
//! `PersistentStore` 在后端（SQLite / 内存）之上维护一份 JSON 缓存，
//! 通过实现 [`StoreKey`] 的零尺寸类型声明"键名 + 值类型 + 默认值"，
//! 调用方拿到的永远是强类型值：
//!
//! - `get::<K>()`：读取缓存，缺失或形状不符时回退到该键默认值
//! - `set::<K>(&v)`：先更新缓存，再同步写入后端；写入失败返回
//!   `AppError::Persistence`，但缓存中的新值保持生效，会话可继续使用
//!
//! # 实现思路
//!
//! - 打开时一次性 `load_all`，逐键解析 JSON；解析失败的键在内存中回退默认值，
//!   后端里的原始文本保持不动，直到该键下一次被 `set`。
//! - 只为后端中确实不存在的键写入默认值；写入失败只告警，不影响启动。
//! - 列表类键用 `get_seq` 逐元素解码，单个坏元素只丢弃它自己。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;
use crate::hotkey::default_accelerator;
use crate::models::{HistoryItem, SnippetItem, WindowBounds};

/// 键值后端：只关心字符串层面的读写
pub trait StoreBackend: Send {
    /// 读取全部键值对（值为 JSON 文本）
    fn load_all(&self) -> Result<Vec<(String, String)>, AppError>;

    /// 写入单个键；返回前必须已持久化
    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError>;
}

/// 持久化 schema 中的一个键
pub trait StoreKey {
    const NAME: &'static str;
    type Value: Serialize + DeserializeOwned;

    fn default_value() -> Self::Value;
}

/// `history`：最多 100 条的历史列表
pub struct HistoryKey;

impl StoreKey for HistoryKey {
    const NAME: &'static str = "history";
    type Value = Vec<HistoryItem>;

    fn default_value() -> Self::Value {
        Vec::new()
    }
}

/// `snippets`：片段列表
pub struct SnippetsKey;

impl StoreKey for SnippetsKey {
    const NAME: &'static str = "snippets";
    type Value = Vec<SnippetItem>;

    fn default_value() -> Self::Value {
        Vec::new()
    }
}

/// `shortcut`：当前快捷键字符串
pub struct ShortcutKey;

impl StoreKey for ShortcutKey {
    const NAME: &'static str = "shortcut";
    type Value = String;

    fn default_value() -> Self::Value {
        default_accelerator().to_string()
    }
}

/// `windowBounds`：用户最后一次拖动/缩放后的窗口外框
pub struct WindowBoundsKey;

impl StoreKey for WindowBoundsKey {
    const NAME: &'static str = "windowBounds";
    type Value = Option<WindowBounds>;

    fn default_value() -> Self::Value {
        None
    }
}

/// `followCursor`：窗口是否跟随光标
pub struct FollowCursorKey;

impl StoreKey for FollowCursorKey {
    const NAME: &'static str = "followCursor";
    type Value = bool;

    fn default_value() -> Self::Value {
        true
    }
}

fn schema_defaults() -> Vec<(&'static str, Value)> {
    fn entry<K: StoreKey>() -> (&'static str, Value) {
        (K::NAME, serde_json::to_value(K::default_value()).unwrap_or(Value::Null))
    }

    vec![
        entry::<HistoryKey>(),
        entry::<SnippetsKey>(),
        entry::<ShortcutKey>(),
        entry::<WindowBoundsKey>(),
        entry::<FollowCursorKey>(),
    ]
}

/// 带 schema 默认值的类型化存储
pub struct PersistentStore {
    backend: Box<dyn StoreBackend>,
    values: HashMap<String, Value>,
}

impl PersistentStore {
    /// 从后端加载全部键，并为缺失的键写入默认值
    pub fn open(backend: impl StoreBackend + 'static) -> Self {
        let mut backend: Box<dyn StoreBackend> = Box::new(backend);
        let mut values = HashMap::new();
        let mut stored_keys = HashSet::new();

        let loaded = match backend.load_all() {
            Ok(rows) => {
                for (key, raw) in rows {
                    stored_keys.insert(key.clone());
                    match serde_json::from_str::<Value>(&raw) {
                        Ok(value) => {
                            values.insert(key, value);
                        }
                        Err(err) => {
                            log::warn!("键 '{}' 的持久化值无法解析，本次使用默认值，原始数据保留: {}", key, err);
                        }
                    }
                }
                true
            }
            Err(err) => {
                log::error!("加载持久化数据失败，全部使用默认值且不写回: {}", err);
                false
            }
        };

        for (key, default) in schema_defaults() {
            if values.contains_key(key) {
                continue;
            }
            if loaded && !stored_keys.contains(key) {
                if let Err(err) = backend.write(key, &default.to_string()) {
                    log::warn!("初始化默认值 '{}' 失败: {}", key, err);
                }
            }
            values.insert(key.to_string(), default);
        }

        Self { backend, values }
    }

    /// 读取键值，缺失或形状不符时返回默认值
    pub fn get<K: StoreKey>(&self) -> K::Value {
        let Some(value) = self.values.get(K::NAME) else {
            return K::default_value();
        };

        match serde_json::from_value(value.clone()) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::warn!("键 '{}' 的值形状不符，使用默认值: {}", K::NAME, err);
                K::default_value()
            }
        }
    }

    /// 逐元素读取列表键
    ///
    /// 无法解码的元素被丢弃并告警，其余元素照常返回；值本身不是数组时返回空列表。
    pub fn get_seq<K, T>(&self) -> Vec<T>
    where
        K: StoreKey<Value = Vec<T>>,
        T: DeserializeOwned,
    {
        let Some(value) = self.values.get(K::NAME) else {
            return Vec::new();
        };
        let Some(elements) = value.as_array() else {
            log::warn!("键 '{}' 的值不是列表，使用空列表", K::NAME);
            return Vec::new();
        };

        elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| match serde_json::from_value(element.clone()) {
                Ok(item) => Some(item),
                Err(err) => {
                    log::warn!("键 '{}' 第 {} 项无法解码，已跳过: {}", K::NAME, index, err);
                    None
                }
            })
            .collect()
    }

    /// 更新键值：缓存立即生效，随后同步写入后端
    pub fn set<K: StoreKey>(&mut self, value: &K::Value) -> Result<(), AppError> {
        let json = serde_json::to_value(value)?;
        let raw = json.to_string();
        self.values.insert(K::NAME.to_string(), json);

        self.backend
            .write(K::NAME, &raw)
            .map_err(|e| AppError::Persistence(format!("写入 '{}' 未完成: {}", K::NAME, e)))
    }
}

/// 内存后端
///
/// 克隆体共享同一份数据，测试可以"关闭"后用同一份数据重新打开，
/// 也可以通过 `set_fail_writes` 模拟写盘失败。
#[derive(Clone, Default)]
pub struct MemoryBackend {
    data: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// 直接读取某个键的原始 JSON 文本
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// 直接写入原始文本（用于构造损坏数据）
    pub fn insert_raw(&self, key: &str, raw: &str) {
        self.lock().insert(key.to_string(), raw.to_string());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.data.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("内存存储锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }
}

impl StoreBackend for MemoryBackend {
    fn load_all(&self) -> Result<Vec<(String, String)>, AppError> {
        Ok(self
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("模拟写入失败".to_string()));
        }
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_run_initializes_every_default() {
        let backend = MemoryBackend::new();
        let store = PersistentStore::open(backend.clone());

        assert!(store.get::<HistoryKey>().is_empty());
        assert!(store.get::<SnippetsKey>().is_empty());
        assert_eq!(store.get::<ShortcutKey>(), default_accelerator());
        assert_eq!(store.get::<WindowBoundsKey>(), None);
        assert!(store.get::<FollowCursorKey>());

        assert_eq!(backend.raw("history").as_deref(), Some("[]"));
        assert_eq!(backend.raw("windowBounds").as_deref(), Some("null"));
        assert_eq!(backend.raw("followCursor").as_deref(), Some("true"));
    }

    #[test]
    fn malformed_key_falls_back_without_touching_others() {
        let backend = MemoryBackend::new();
        backend.insert_raw("history", "{not json");
        backend.insert_raw("followCursor", "false");
        backend.insert_raw("shortcut", "42");

        let store = PersistentStore::open(backend.clone());

        assert!(store.get::<HistoryKey>().is_empty());
        assert!(!store.get::<FollowCursorKey>());
        // 合法 JSON 但类型不符
        assert_eq!(store.get::<ShortcutKey>(), default_accelerator());
    }

    #[test]
    fn unreadable_value_is_left_on_disk() {
        let backend = MemoryBackend::new();
        let truncated = r#"[{"id":"1","title":"Sig","content":"Best","createdAt":1"#;
        backend.insert_raw("snippets", truncated);

        let store = PersistentStore::open(backend.clone());

        assert!(store.get_seq::<SnippetsKey, _>().is_empty());
        assert_eq!(backend.raw("snippets").as_deref(), Some(truncated));
        // 真正缺失的键仍然补写默认值
        assert_eq!(backend.raw("history").as_deref(), Some("[]"));
    }

    #[test]
    fn failed_load_writes_nothing_back() {
        struct Unreadable(MemoryBackend);

        impl StoreBackend for Unreadable {
            fn load_all(&self) -> Result<Vec<(String, String)>, AppError> {
                Err(AppError::Database("磁盘不可读".to_string()))
            }

            fn write(&mut self, key: &str, value: &str) -> Result<(), AppError> {
                self.0.write(key, value)
            }
        }

        let backend = MemoryBackend::new();
        let store = PersistentStore::open(Unreadable(backend.clone()));

        assert!(store.get::<FollowCursorKey>());
        assert_eq!(backend.raw("history"), None);
    }

    #[test]
    fn bad_list_element_drops_only_itself() {
        let backend = MemoryBackend::new();
        backend.insert_raw(
            "history",
            r#"[{"id":"1","content":"keep me","capturedAt":1},{"id":"2","content":"x"}]"#,
        );

        let store = PersistentStore::open(backend);
        let items = store.get_seq::<HistoryKey, _>();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "keep me");
    }

    #[test]
    fn non_array_list_value_is_empty() {
        let backend = MemoryBackend::new();
        backend.insert_raw("snippets", r#"{"oops":true}"#);

        let store = PersistentStore::open(backend);
        assert!(store.get_seq::<SnippetsKey, _>().is_empty());
    }

    #[test]
    fn failed_write_keeps_memory_value() {
        let backend = MemoryBackend::new();
        let mut store = PersistentStore::open(backend.clone());
        backend.set_fail_writes(true);

        let err = store.set::<FollowCursorKey>(&false).unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
        assert!(!store.get::<FollowCursorKey>(), "内存值应已更新");
        assert_eq!(backend.raw("followCursor").as_deref(), Some("true"));
    }

    #[test]
    fn set_persists_before_returning() {
        let backend = MemoryBackend::new();
        let mut store = PersistentStore::open(backend.clone());
        let bounds = WindowBounds { x: 10, y: 20, width: 600, height: 400 };

        store.set::<WindowBoundsKey>(&Some(bounds)).expect("write bounds");

        let reopened = PersistentStore::open(backend);
        assert_eq!(reopened.get::<WindowBoundsKey>(), Some(bounds));
    }
}
