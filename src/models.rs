//! 数据模型
//!
//! 代理核心与展示层之间传递的所有结构体都定义在这里。
//! 字段统一以 camelCase 序列化，既是持久化格式，也是 IPC 负载格式。

use serde::{Deserialize, Serialize};

/// 不透明的条目标识（UUID v4 字符串）
pub type ItemId = String;

/// 生成新的条目标识
pub fn new_item_id() -> ItemId {
    uuid::Uuid::new_v4().to_string()
}

/// 当前时间（Unix 毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// 剪贴板历史条目
///
/// 身份由 `id` 决定，去重按 `content` 比较。
/// 旧版存储写入的 `timestamp` 字段与 `type` 标签在读取时被兼容。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: ItemId,
    pub content: String,
    #[serde(alias = "timestamp")]
    pub captured_at: i64,
}

/// 用户维护的片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetItem {
    pub id: ItemId,
    pub title: String,
    pub content: String,
    pub created_at: i64,
}

/// 新增片段的请求负载
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSnippet {
    pub title: String,
    pub content: String,
}

/// 编辑片段的请求负载
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SnippetEdit {
    pub id: ItemId,
    pub title: String,
    pub content: String,
}

/// 窗口外框（全局物理坐标）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// 进程级设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettings {
    pub follow_cursor: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self { follow_cursor: true }
    }
}

/// 设置更新请求，缺省字段保持不变
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default)]
    pub follow_cursor: Option<bool>,
}
