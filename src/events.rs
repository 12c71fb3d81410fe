//! 代理 → 展示层的事件总线
//!
//! # 设计思路
//!
//! - 每个订阅者持有一条独立的有界通道，发布时用 `try_send` 逐个投递完整快照，
//!   慢订阅者不会阻塞代理主循环。
//! - 订阅者必须持续读取接收端。积压达到 [`SUBSCRIBER_BACKLOG`] 条的订阅者被视为
//!   卡死并移除，它的接收端读完剩余事件后收到 `None`；重新订阅即可拿到新快照。
//! - `subscribe` 返回 [`Subscription`]，它是取消句柄：显式 `cancel()` 或被丢弃时
//!   自动退订（与剪贴板 IgnoreGuard 同样的 RAII 思路），窗口销毁重建不会遗留回调。
//! - 接收端已关闭的订阅者在下一次发布时被清理。
//!
//! # 实现思路
//!
//! 订阅表放在 `Arc<Mutex<..>>` 中；`Subscription` 只持有 `Weak`，
//! 总线先于句柄销毁时退订变为空操作。

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::models::{AgentSettings, HistoryItem, SnippetItem};

pub type SubscriberId = u64;

/// 单个订阅者允许积压的事件数
pub const SUBSCRIBER_BACKLOG: usize = 64;

/// 快捷键换绑失败的负载：保留被拒绝的字符串，界面据此提示用户重试
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortcutErrorPayload {
    pub accelerator: String,
    pub message: String,
}

/// 代理推送给展示层的事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "kebab-case")]
pub enum AgentEvent {
    HistoryUpdate(Vec<HistoryItem>),
    SnippetsUpdate(Vec<SnippetItem>),
    ShortcutUpdate(String),
    ShortcutError(ShortcutErrorPayload),
    SettingsUpdate(AgentSettings),
    /// 写盘失败；内存中的数据仍然有效
    PersistenceWarning(String),
}

impl AgentEvent {
    /// 事件名（与序列化标签一致）
    pub fn name(&self) -> &'static str {
        match self {
            AgentEvent::HistoryUpdate(_) => "history-update",
            AgentEvent::SnippetsUpdate(_) => "snippets-update",
            AgentEvent::ShortcutUpdate(_) => "shortcut-update",
            AgentEvent::ShortcutError(_) => "shortcut-error",
            AgentEvent::SettingsUpdate(_) => "settings-update",
            AgentEvent::PersistenceWarning(_) => "persistence-warning",
        }
    }

    /// 仅负载部分，供按事件名分发的 IPC 使用
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            AgentEvent::HistoryUpdate(items) => serde_json::to_value(items),
            AgentEvent::SnippetsUpdate(items) => serde_json::to_value(items),
            AgentEvent::ShortcutUpdate(accelerator) => serde_json::to_value(accelerator),
            AgentEvent::ShortcutError(payload) => serde_json::to_value(payload),
            AgentEvent::SettingsUpdate(settings) => serde_json::to_value(settings),
            AgentEvent::PersistenceWarning(message) => serde_json::to_value(message),
        }
    }
}

#[derive(Default)]
struct Subscribers {
    next_id: SubscriberId,
    senders: HashMap<SubscriberId, Sender<AgentEvent>>,
}

/// 投递一条事件；返回 `false` 表示该订阅者应被移除
fn deliver(id: SubscriberId, tx: &Sender<AgentEvent>, event: AgentEvent) -> bool {
    match tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            log::warn!("订阅者 #{} 积压 {} 条事件未读取，移除", id, SUBSCRIBER_BACKLOG);
            false
        }
        Err(TrySendError::Closed(_)) => {
            log::debug!("订阅者 #{} 已断开，移除", id);
            false
        }
    }
}

fn lock(inner: &Mutex<Subscribers>) -> MutexGuard<'_, Subscribers> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            log::warn!("事件总线锁中毒，继续使用恢复数据");
            poisoned.into_inner()
        }
    }
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Subscribers>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新增订阅者；调用方需要持续读取返回的接收端
    pub fn subscribe(&self) -> (Subscription, Receiver<AgentEvent>) {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BACKLOG);
        let mut subscribers = lock(&self.inner);
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.senders.insert(id, tx);
        log::debug!("📡 新订阅者 #{}，当前 {} 个", id, subscribers.senders.len());

        let subscription = Subscription {
            id,
            bus: Arc::downgrade(&self.inner),
        };
        (subscription, rx)
    }

    /// 广播给全部订阅者
    pub fn publish(&self, event: AgentEvent) {
        let mut subscribers = lock(&self.inner);
        subscribers
            .senders
            .retain(|id, tx| deliver(*id, tx, event.clone()));
    }

    /// 只投递给指定订阅者；订阅者不存在、已断开或积压已满时返回 `false`
    pub fn send_to(&self, id: SubscriberId, event: AgentEvent) -> bool {
        let mut subscribers = lock(&self.inner);
        let Some(tx) = subscribers.senders.get(&id) else {
            return false;
        };
        if deliver(id, tx, event) {
            return true;
        }
        subscribers.senders.remove(&id);
        false
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).senders.len()
    }
}

/// 订阅取消句柄；丢弃即退订
#[must_use = "丢弃 Subscription 会立即退订"]
pub struct Subscription {
    id: SubscriberId,
    bus: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// 显式退订
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            lock(&inner).senders.remove(&self.id);
            log::debug!("📡 订阅者 #{} 已退订", self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
