//! # clipshelf：无界面运行入口
//!
//! 只运行剪贴板监控与持久化：没有窗口、没有全局快捷键、不注入按键。
//! 桌面版通过 `tauri` feature 以插件形式接入宿主应用，见 `tauri_shell`。

use std::sync::Arc;

use clipshelf::clipboard::ArboardClipboard;
use clipshelf::config::load_config;
use clipshelf::db::Database;
use clipshelf::events::{AgentEvent, EventBus};
use clipshelf::hotkey::DisabledShortcuts;
use clipshelf::input::LoggingInjector;
use clipshelf::store::MemoryBackend;
use clipshelf::window_position::HeadlessSurface;
use clipshelf::{AgentCore, AgentPorts, AgentRuntime};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config();
    let ports = AgentPorts {
        clipboard: Box::new(ArboardClipboard::new()),
        shortcuts: Box::new(DisabledShortcuts),
        surface: Box::new(HeadlessSurface::default()),
        injector: Arc::new(LoggingInjector),
    };
    let bus = EventBus::new();

    let core = match config.resolve_db_path().and_then(|path| Database::open(&path)) {
        Ok(db) => AgentCore::start(config, db, ports, bus),
        Err(err) => {
            log::error!("数据库初始化失败，本次运行的数据不会保存: {err}");
            AgentCore::start(config, MemoryBackend::new(), ports, bus)
        }
    };

    let (runtime, handle) = AgentRuntime::new(core);

    let (subscription, mut events) = match handle.subscribe() {
        Ok(subscribed) => subscribed,
        Err(err) => {
            log::error!("订阅代理事件失败: {err}");
            return;
        }
    };
    let logger = tokio::spawn(async move {
        let _subscription = subscription;
        while let Some(event) = events.recv().await {
            match event {
                AgentEvent::HistoryUpdate(items) => log::info!("历史共 {} 条", items.len()),
                AgentEvent::PersistenceWarning(message) => log::warn!("{message}"),
                other => log::debug!("事件 {}", other.name()),
            }
        }
    });

    let agent = tokio::spawn(runtime.run());

    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("监听退出信号失败: {err}");
    }
    log::info!("收到退出信号");

    if let Err(err) = handle.shutdown() {
        log::debug!("{err}");
    }
    if let Err(err) = agent.await {
        log::error!("代理主循环异常退出: {err}");
    }
    logger.abort();
}
