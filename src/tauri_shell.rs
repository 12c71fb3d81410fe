//! Tauri 桌面壳层接入（`tauri` feature）
//!
//! 以插件形式挂到宿主应用上：
//!
//! - 用主窗口实现 [`Surface`]，用 global-shortcut 插件实现 [`ShortcutBackend`]
//! - 快捷键回调与窗口事件只转换成 [`AgentCommand`] 投递给主循环
//! - 事件总线上的事件按事件名 `emit` 给前端
//! - 前端通过 `plugin:clipshelf|send_command` 发命令，窗口重建后调用
//!   `plugin:clipshelf|surface_ready` 重新获取全量快照
//! - 应用退出时释放全局快捷键
//!
//! ```ignore
//! tauri::Builder::default()
//!     .plugin(clipshelf::tauri_shell::init(clipshelf::config::load_config()))
//!     .run(tauri::generate_context!())
//! ```

use std::sync::Arc;

use tauri::plugin::{Builder, TauriPlugin};
use tauri::{
    AppHandle, Emitter, Manager, PhysicalPosition, PhysicalSize, RunEvent, Runtime, State,
    WebviewWindow, WindowEvent,
};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, ShortcutState};

use crate::agent::{AgentCore, AgentPorts};
use crate::clipboard::ArboardClipboard;
use crate::commands::{AgentCommand, UiCommand};
use crate::config::AgentConfig;
use crate::db::Database;
use crate::error::AppError;
use crate::events::{EventBus, SubscriberId};
use crate::hotkey::{Accelerator, ShortcutBackend};
use crate::input::EnigoInjector;
use crate::models::WindowBounds;
use crate::runtime::{AgentHandle, AgentRuntime};
use crate::store::MemoryBackend;
use crate::window_position::{BoundsChange, MonitorArea, Point, Rect, Size as PanelSize, Surface};

const PLUGIN_NAME: &str = "clipshelf";
const MAIN_WINDOW_LABEL: &str = "main";

/// 负责 emit 的订阅者编号，`surface_ready` 用它请求快照
struct EventForwarder(SubscriberId);

fn window_error(action: &str, e: tauri::Error) -> AppError {
    AppError::Window(format!("{}: {}", action, e))
}

struct TauriSurface<R: Runtime> {
    window: WebviewWindow<R>,
}

impl<R: Runtime> Surface for TauriSurface<R> {
    fn outer_size(&self) -> Result<PanelSize, AppError> {
        let size = self
            .window
            .outer_size()
            .map_err(|e| window_error("获取窗口尺寸失败", e))?;
        Ok(PanelSize::new(size.width, size.height))
    }

    fn set_position(&mut self, origin: Point) -> Result<(), AppError> {
        self.window
            .set_position(PhysicalPosition::new(origin.x, origin.y))
            .map_err(|e| window_error("设置窗口位置失败", e))
    }

    fn set_bounds(&mut self, bounds: WindowBounds) -> Result<(), AppError> {
        self.window
            .set_size(PhysicalSize::new(bounds.width, bounds.height))
            .map_err(|e| window_error("设置窗口尺寸失败", e))?;
        self.set_position(bounds.origin())
    }

    fn show(&mut self) -> Result<(), AppError> {
        self.window.show().map_err(|e| window_error("显示窗口失败", e))
    }

    fn hide(&mut self) -> Result<(), AppError> {
        self.window.hide().map_err(|e| window_error("隐藏窗口失败", e))
    }

    fn focus(&mut self) -> Result<(), AppError> {
        self.window
            .set_focus()
            .map_err(|e| window_error("窗口聚焦失败", e))
    }

    fn set_visible_on_all_workspaces(&mut self, visible: bool) -> Result<(), AppError> {
        self.window
            .set_visible_on_all_workspaces(visible)
            .map_err(|e| window_error("设置跨工作区可见失败", e))
    }

    fn cursor_position(&self) -> Result<Point, AppError> {
        let pos = self
            .window
            .cursor_position()
            .map_err(|e| window_error("读取光标位置失败", e))?;
        Ok(Point::new(pos.x.round() as i32, pos.y.round() as i32))
    }

    fn monitors(&self) -> Result<Vec<MonitorArea>, AppError> {
        let primary = self.window.primary_monitor().ok().flatten();
        let monitors = self
            .window
            .available_monitors()
            .map_err(|e| window_error("获取显示器列表失败", e))?;

        Ok(monitors
            .iter()
            .map(|monitor| {
                let area = monitor.work_area();
                MonitorArea {
                    work_area: Rect {
                        x: area.position.x,
                        y: area.position.y,
                        width: area.size.width,
                        height: area.size.height,
                    },
                    is_primary: primary.as_ref().is_some_and(|p| {
                        p.position() == monitor.position() && p.size() == monitor.size()
                    }),
                }
            })
            .collect())
    }
}

struct TauriShortcuts<R: Runtime> {
    app: AppHandle<R>,
}

impl<R: Runtime> ShortcutBackend for TauriShortcuts<R> {
    fn register(&mut self, accelerator: &Accelerator) -> Result<(), String> {
        self.app
            .global_shortcut()
            .register(accelerator.to_string().as_str())
            .map_err(|e| e.to_string())
    }

    fn unregister_all(&mut self) -> Result<(), String> {
        self.app
            .global_shortcut()
            .unregister_all()
            .map_err(|e| e.to_string())
    }
}

fn read_bounds<R: Runtime>(window: &WebviewWindow<R>) -> Result<WindowBounds, AppError> {
    let position = window
        .outer_position()
        .map_err(|e| window_error("读取窗口位置失败", e))?;
    let size = window
        .outer_size()
        .map_err(|e| window_error("读取窗口尺寸失败", e))?;
    Ok(WindowBounds {
        x: position.x,
        y: position.y,
        width: size.width,
        height: size.height,
    })
}

fn forward_window_events<R: Runtime>(window: &WebviewWindow<R>, handle: AgentHandle) {
    let observed = window.clone();
    window.on_window_event(move |event| {
        let command = match event {
            WindowEvent::Focused(false) => AgentCommand::WindowBlurred,
            WindowEvent::Moved(_) | WindowEvent::Resized(_) => {
                let change = match event {
                    WindowEvent::Resized(_) => BoundsChange::Resized,
                    _ => BoundsChange::Moved,
                };
                match read_bounds(&observed) {
                    Ok(bounds) => AgentCommand::WindowBoundsChanged(change, bounds),
                    Err(e) => {
                        log::debug!("{}", e);
                        return;
                    }
                }
            }
            _ => return,
        };
        if let Err(e) = handle.send(command) {
            log::debug!("窗口事件未送达: {}", e);
        }
    });
}

fn forward_agent_events<R: Runtime>(app: &AppHandle<R>, handle: &AgentHandle) -> Result<SubscriberId, AppError> {
    let (subscription, mut events) = handle.subscribe()?;
    let id = subscription.id();
    let emitter = app.clone();

    tauri::async_runtime::spawn(async move {
        let _subscription = subscription;
        while let Some(event) = events.recv().await {
            let payload = match event.payload() {
                Ok(payload) => payload,
                Err(e) => {
                    log::warn!("事件 '{}' 序列化失败: {}", event.name(), e);
                    continue;
                }
            };
            if let Err(e) = emitter.emit(event.name(), payload) {
                log::warn!("事件 '{}' 发送到前端失败: {}", event.name(), e);
            }
        }
    });

    Ok(id)
}

fn start_agent<R: Runtime>(app: &AppHandle<R>, config: AgentConfig) -> Result<(), Box<dyn std::error::Error>> {
    let window = app
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| AppError::Window(format!("找不到窗口 '{}'", MAIN_WINDOW_LABEL)))?;

    app.plugin(
        tauri_plugin_global_shortcut::Builder::new()
            .with_handler(|app, _shortcut, event| {
                if event.state != ShortcutState::Pressed {
                    return;
                }
                if let Some(handle) = app.try_state::<AgentHandle>() {
                    if let Err(e) = handle.send(AgentCommand::HotkeyPressed) {
                        log::warn!("快捷键事件未送达: {}", e);
                    }
                }
            })
            .build(),
    )?;

    let ports = AgentPorts {
        clipboard: Box::new(ArboardClipboard::new()),
        shortcuts: Box::new(TauriShortcuts { app: app.clone() }),
        surface: Box::new(TauriSurface { window: window.clone() }),
        injector: Arc::new(EnigoInjector),
    };
    let bus = EventBus::new();

    let core = match config.resolve_db_path().and_then(|path| Database::open(&path)) {
        Ok(db) => AgentCore::start(config, db, ports, bus),
        Err(e) => {
            log::error!("数据库初始化失败，本次运行的数据不会保存: {}", e);
            AgentCore::start(config, MemoryBackend::new(), ports, bus)
        }
    };

    let (runtime, handle) = AgentRuntime::new(core);
    app.manage(handle.clone());

    let forwarder = forward_agent_events(app, &handle)?;
    app.manage(EventForwarder(forwarder));
    forward_window_events(&window, handle);

    tauri::async_runtime::spawn(async move {
        runtime.run().await;
    });

    log::info!("setup: clipshelf 代理已接入");
    Ok(())
}

/// 前端命令入口
#[tauri::command]
fn send_command(command: UiCommand, handle: State<'_, AgentHandle>) -> Result<(), AppError> {
    handle.send(command)
}

/// 前端（重新）挂载完成，请求全量快照
#[tauri::command]
fn surface_ready(
    handle: State<'_, AgentHandle>,
    forwarder: State<'_, EventForwarder>,
) -> Result<(), AppError> {
    handle.send(AgentCommand::SyncSubscriber(forwarder.0))
}

pub fn init<R: Runtime>(config: AgentConfig) -> TauriPlugin<R> {
    Builder::new(PLUGIN_NAME)
        .invoke_handler(tauri::generate_handler![send_command, surface_ready])
        .setup(move |app, _api| start_agent(app, config))
        .on_event(|app, event| {
            if let RunEvent::Exit = event {
                // 代理句柄存在说明 setup 已完成，快捷键插件一定已注册
                let Some(handle) = app.try_state::<AgentHandle>() else {
                    return;
                };
                if let Err(e) = handle.shutdown() {
                    log::debug!("退出时代理已停止: {}", e);
                }
                // 主循环可能来不及处理 Shutdown，这里直接注销
                if let Err(e) = app.global_shortcut().unregister_all() {
                    log::warn!("退出前清理全局快捷键失败: {}", e);
                }
            }
        })
        .build()
}
