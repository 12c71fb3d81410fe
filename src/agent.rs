//! 代理核心聚合
//!
//! # 设计思路
//!
//! `AgentCore` 是进程内唯一的状态所有者：历史、片段、设置、快捷键、窗口状态
//! 全部由它独占，外部只能通过 [`AgentCommand`] 请求修改，通过 [`EventBus`]
//! 收到完整快照。所有修改都发生在运行时主循环这一条执行路径上，
//! 状态本身不需要加锁。
//!
//! # 实现思路
//!
//! - 平台能力（剪贴板、快捷键、窗口、按键注入）以 trait 对象注入，见 [`AgentPorts`]。
//! - 每次修改：先改内存 → 同步落盘 → 广播快照。落盘失败时内存值继续生效，
//!   记录告警并广播 `persistence-warning`，代理不退出。
//! - 所有命令对重复投递安全：删除不存在的条目、清空空历史都只是重新广播当前快照。

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::clipboard::watcher::PollOutcome;
use crate::clipboard::{ClipboardWatcher, SystemClipboard};
use crate::commands::{AgentCommand, UiCommand};
use crate::config::{AgentConfig, DEFAULT_WINDOW_SIZE};
use crate::error::AppError;
use crate::events::{AgentEvent, EventBus, ShortcutErrorPayload, SubscriberId};
use crate::history::HistoryStore;
use crate::hotkey::{HotkeyRegistrar, ShortcutBackend};
use crate::input::{KeystrokeInjector, PasteSequencer};
use crate::models::{AgentSettings, SettingsPatch, WindowBounds};
use crate::snippets::SnippetStore;
use crate::store::{FollowCursorKey, PersistentStore, ShortcutKey, StoreBackend, WindowBoundsKey};
use crate::window_position::{BoundsChange, Size, Surface, WindowPositioner, WindowState};

/// 代理依赖的平台能力
pub struct AgentPorts {
    pub clipboard: Box<dyn SystemClipboard>,
    pub shortcuts: Box<dyn ShortcutBackend>,
    pub surface: Box<dyn Surface>,
    pub injector: Arc<dyn KeystrokeInjector>,
}

pub struct AgentCore {
    config: AgentConfig,
    store: PersistentStore,
    history: HistoryStore,
    snippets: SnippetStore,
    settings: AgentSettings,
    clipboard: Box<dyn SystemClipboard>,
    watcher: ClipboardWatcher,
    hotkeys: HotkeyRegistrar,
    positioner: WindowPositioner,
    paste: PasteSequencer,
    bus: EventBus,
}

impl AgentCore {
    /// 加载持久化状态、以当前剪贴板为基线、绑定快捷键
    ///
    /// 快捷键绑定失败不会阻止启动。
    pub fn start(
        config: AgentConfig,
        backend: impl StoreBackend + 'static,
        ports: AgentPorts,
        bus: EventBus,
    ) -> Self {
        let store = PersistentStore::open(backend);
        let history = HistoryStore::load(&store);
        let snippets = SnippetStore::load(&store);
        let settings = AgentSettings {
            follow_cursor: store.get::<FollowCursorKey>(),
        };

        let mut clipboard = ports.clipboard;
        let watcher = ClipboardWatcher::seeded(clipboard.as_mut());

        let mut hotkeys = HotkeyRegistrar::new(ports.shortcuts);
        hotkeys.bind_initial(&store.get::<ShortcutKey>());

        let (width, height) = DEFAULT_WINDOW_SIZE;
        let positioner = WindowPositioner::new(ports.surface, Size::new(width, height));
        let paste = PasteSequencer::new(ports.injector, config.paste_delay());

        log::info!(
            "✅ 代理已启动：历史 {} 条，片段 {} 条，跟随光标={}",
            history.len(),
            snippets.len(),
            settings.follow_cursor
        );

        Self {
            config,
            store,
            history,
            snippets,
            settings,
            clipboard,
            watcher,
            hotkeys,
            positioner,
            paste,
            bus,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn snippets(&self) -> &SnippetStore {
        &self.snippets
    }

    pub fn settings(&self) -> AgentSettings {
        self.settings
    }

    /// 持久化的快捷键字符串
    pub fn shortcut(&self) -> String {
        self.store.get::<ShortcutKey>()
    }

    /// 当前已注册到系统的快捷键
    pub fn active_shortcut(&self) -> Option<String> {
        self.hotkeys.active().map(ToString::to_string)
    }

    pub fn window_state(&self) -> WindowState {
        self.positioner.state()
    }

    pub fn saved_bounds(&self) -> Option<WindowBounds> {
        self.store.get::<WindowBoundsKey>()
    }

    /// 处理一条命令；`Break` 表示主循环应退出
    pub async fn handle_command(&mut self, command: AgentCommand) -> ControlFlow<()> {
        match command {
            AgentCommand::Ui(ui) => self.handle_ui(ui),
            AgentCommand::HotkeyPressed => self.toggle_window().await,
            AgentCommand::WindowBlurred => self.on_window_blurred(),
            AgentCommand::WindowBoundsChanged(change, bounds) => {
                self.on_window_bounds_changed(change, bounds)
            }
            AgentCommand::SyncSubscriber(id) => self.sync_subscriber(id),
            AgentCommand::Shutdown => {
                self.shutdown();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn handle_ui(&mut self, command: UiCommand) {
        match command {
            UiCommand::PasteItem(item) => self.paste_and_log(&item.content),
            UiCommand::DeleteItem(id) => self.delete_history_item(&id),
            UiCommand::ClearHistory => self.clear_history(),
            UiCommand::HideWindow => {
                if let Err(e) = self.positioner.hide() {
                    log::warn!("隐藏面板失败: {}", e);
                }
            }
            UiCommand::GetShortcut => self.bus.publish(AgentEvent::ShortcutUpdate(self.shortcut())),
            UiCommand::UpdateShortcut(raw) => self.update_shortcut(&raw),
            UiCommand::UpdateSettings(patch) => self.update_settings(patch),
            UiCommand::AddSnippet(new) => self.add_snippet(&new.title, &new.content),
            UiCommand::UpdateSnippet(edit) => self.update_snippet(&edit.id, &edit.title, &edit.content),
            UiCommand::DeleteSnippet(id) => self.delete_snippet(&id),
            UiCommand::CopySnippet(content) => self.paste_and_log(&content),
        }
    }

    // ----- 剪贴板 -----

    /// 轮询一拍剪贴板；外部变化记入历史并广播
    pub fn poll_clipboard(&mut self) {
        let PollOutcome::Changed(text) = self.watcher.poll(self.clipboard.as_mut()) else {
            return;
        };

        if let Some(item) = self.history.record(&text) {
            log::debug!("📋 捕获剪贴板变化：{} 个字符", item.content.chars().count());
            self.persist_history();
            self.publish_history();
        }
    }

    /// 写剪贴板 → 隐藏面板 → 延迟注入粘贴按键
    ///
    /// 不改变历史顺序：自身写入已被监控忽略。
    pub fn paste(&mut self, content: &str) -> Result<JoinHandle<()>, AppError> {
        self.paste.execute(
            content,
            self.clipboard.as_mut(),
            &mut self.watcher,
            &mut self.positioner,
        )
    }

    fn paste_and_log(&mut self, content: &str) {
        if let Err(e) = self.paste(content) {
            log::error!("粘贴失败，已中止: {}", e);
        }
    }

    // ----- 历史 -----

    fn delete_history_item(&mut self, id: &str) {
        if self.history.delete(id) {
            self.persist_history();
        } else {
            log::debug!("删除的历史条目 {} 不存在", id);
        }
        self.publish_history();
    }

    fn clear_history(&mut self) {
        if self.history.clear() {
            self.persist_history();
            log::info!("🗑️ 历史已清空");
        }
        self.publish_history();
    }

    fn persist_history(&mut self) {
        let result = self.history.persist(&mut self.store);
        self.report_persistence(result);
    }

    fn publish_history(&self) {
        self.bus.publish(AgentEvent::HistoryUpdate(self.history.snapshot()));
    }

    // ----- 片段 -----

    fn add_snippet(&mut self, title: &str, content: &str) {
        match self.snippets.add(title, content) {
            Some(item) => {
                log::debug!("新增片段 {}", item.id);
                self.persist_snippets();
                self.publish_snippets();
            }
            None => log::debug!("片段标题或内容为空，忽略"),
        }
    }

    fn update_snippet(&mut self, id: &str, title: &str, content: &str) {
        if self.snippets.update(id, title, content) {
            self.persist_snippets();
            self.publish_snippets();
        } else {
            log::debug!("片段 {} 未更新（不存在或输入为空）", id);
        }
    }

    fn delete_snippet(&mut self, id: &str) {
        if self.snippets.delete(id) {
            self.persist_snippets();
        }
        self.publish_snippets();
    }

    fn persist_snippets(&mut self) {
        let result = self.snippets.persist(&mut self.store);
        self.report_persistence(result);
    }

    fn publish_snippets(&self) {
        self.bus.publish(AgentEvent::SnippetsUpdate(self.snippets.snapshot()));
    }

    // ----- 快捷键与设置 -----

    fn update_shortcut(&mut self, raw: &str) {
        match self.hotkeys.rebind(raw) {
            Ok(accelerator) => {
                let accelerator = accelerator.to_string();
                let result = self.store.set::<ShortcutKey>(&accelerator);
                self.report_persistence(result);
                self.bus.publish(AgentEvent::ShortcutUpdate(accelerator));
            }
            Err(e) => {
                let accelerator = e.rejected_accelerator().unwrap_or(raw).to_string();
                self.bus.publish(AgentEvent::ShortcutError(ShortcutErrorPayload {
                    accelerator,
                    message: e.to_string(),
                }));
            }
        }
    }

    fn update_settings(&mut self, patch: SettingsPatch) {
        if let Some(follow_cursor) = patch.follow_cursor {
            self.settings.follow_cursor = follow_cursor;
            let result = self.store.set::<FollowCursorKey>(&follow_cursor);
            self.report_persistence(result);
            log::info!("⚙️ 跟随光标 = {}", follow_cursor);
        }
        self.bus.publish(AgentEvent::SettingsUpdate(self.settings));
    }

    // ----- 窗口 -----

    async fn toggle_window(&mut self) {
        let saved = self.store.get::<WindowBoundsKey>();
        match self.positioner.toggle(self.settings.follow_cursor, saved).await {
            Ok(state) => log::debug!("面板切换为 {:?}", state),
            Err(e) => log::error!("切换面板失败: {}", e),
        }
    }

    fn on_window_blurred(&mut self) {
        match self.positioner.on_blur(self.config.hide_on_blur) {
            Ok(true) => log::debug!("面板失焦，已隐藏"),
            Ok(false) => {}
            Err(e) => log::warn!("失焦隐藏失败: {}", e),
        }
    }

    fn on_window_bounds_changed(&mut self, change: BoundsChange, bounds: WindowBounds) {
        if let Some(bounds) = self.positioner.on_bounds_changed(change, bounds) {
            let result = self.store.set::<WindowBoundsKey>(&Some(bounds));
            self.report_persistence(result);
        }
    }

    // ----- 订阅 -----

    /// 向指定订阅者推送全部类别的快照
    pub fn sync_subscriber(&self, id: SubscriberId) {
        for event in self.snapshot_events() {
            if !self.bus.send_to(id, event) {
                log::debug!("订阅者 #{} 已不存在，跳过快照", id);
                return;
            }
        }
    }

    /// 向全部订阅者广播全量快照
    pub fn publish_all(&self) {
        for event in self.snapshot_events() {
            self.bus.publish(event);
        }
    }

    fn snapshot_events(&self) -> [AgentEvent; 4] {
        [
            AgentEvent::HistoryUpdate(self.history.snapshot()),
            AgentEvent::SnippetsUpdate(self.snippets.snapshot()),
            AgentEvent::ShortcutUpdate(self.shortcut()),
            AgentEvent::SettingsUpdate(self.settings),
        ]
    }

    fn report_persistence(&self, result: Result<(), AppError>) {
        if let Err(e) = result {
            log::warn!("⚠️ 持久化失败，本次会话内数据仍然有效: {}", e);
            self.bus.publish(AgentEvent::PersistenceWarning(e.to_string()));
        }
    }

    /// 释放系统快捷键
    pub fn shutdown(&mut self) {
        self.hotkeys.release();
        log::info!("代理已停止");
    }
}
