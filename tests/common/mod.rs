//! 集成测试共用的假平台端口

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use clipshelf::agent::{AgentCore, AgentPorts};
use clipshelf::clipboard::SystemClipboard;
use clipshelf::config::AgentConfig;
use clipshelf::error::AppError;
use clipshelf::events::EventBus;
use clipshelf::hotkey::{Accelerator, ShortcutBackend};
use clipshelf::input::KeystrokeInjector;
use clipshelf::models::WindowBounds;
use clipshelf::store::MemoryBackend;
use clipshelf::window_position::{MonitorArea, Point, Rect, Size, Surface};

#[derive(Clone, Default)]
pub struct FakeClipboard {
    text: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl FakeClipboard {
    /// 模拟其他应用复制了文本
    pub fn copy(&self, text: &str) {
        *self.text.lock().unwrap() = Some(text.to_string());
    }

    pub fn text(&self) -> Option<String> {
        self.text.lock().unwrap().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl SystemClipboard for FakeClipboard {
    fn read_text(&mut self) -> Result<Option<String>, AppError> {
        Ok(self.text())
    }

    fn write_text(&mut self, text: &str) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::Clipboard("剪贴板被占用".to_string()));
        }
        self.copy(text);
        Ok(())
    }
}

/// 记录注册状态的快捷键后端；`refuse` 中的组合会被"系统"拒绝
#[derive(Clone, Default)]
pub struct FakeShortcuts {
    registered: Arc<Mutex<Vec<String>>>,
    refuse: Arc<Mutex<Vec<String>>>,
}

impl FakeShortcuts {
    pub fn refuse(&self, accelerator: &str) {
        self.refuse.lock().unwrap().push(accelerator.to_string());
    }

    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }
}

impl ShortcutBackend for FakeShortcuts {
    fn register(&mut self, accelerator: &Accelerator) -> Result<(), String> {
        let name = accelerator.to_string();
        if self.refuse.lock().unwrap().contains(&name) {
            return Err(format!("{} 已被其他应用占用", name));
        }
        self.registered.lock().unwrap().push(name);
        Ok(())
    }

    fn unregister_all(&mut self) -> Result<(), String> {
        self.registered.lock().unwrap().clear();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    SetPosition(Point),
    SetBounds(WindowBounds),
    Show,
    Hide,
    Focus,
    AllWorkspaces(bool),
}

/// 单显示器 1000x800、窗口 300x200 的假窗口
#[derive(Clone, Default)]
pub struct FakeSurface {
    calls: Arc<Mutex<Vec<SurfaceCall>>>,
    cursor: Arc<Mutex<Point>>,
}

impl FakeSurface {
    pub fn move_cursor(&self, x: i32, y: i32) {
        *self.cursor.lock().unwrap() = Point::new(x, y);
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn push(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Surface for FakeSurface {
    fn outer_size(&self) -> Result<Size, AppError> {
        Ok(Size::new(300, 200))
    }

    fn set_position(&mut self, origin: Point) -> Result<(), AppError> {
        self.push(SurfaceCall::SetPosition(origin));
        Ok(())
    }

    fn set_bounds(&mut self, bounds: WindowBounds) -> Result<(), AppError> {
        self.push(SurfaceCall::SetBounds(bounds));
        Ok(())
    }

    fn show(&mut self) -> Result<(), AppError> {
        self.push(SurfaceCall::Show);
        Ok(())
    }

    fn hide(&mut self) -> Result<(), AppError> {
        self.push(SurfaceCall::Hide);
        Ok(())
    }

    fn focus(&mut self) -> Result<(), AppError> {
        self.push(SurfaceCall::Focus);
        Ok(())
    }

    fn set_visible_on_all_workspaces(&mut self, visible: bool) -> Result<(), AppError> {
        self.push(SurfaceCall::AllWorkspaces(visible));
        Ok(())
    }

    fn cursor_position(&self) -> Result<Point, AppError> {
        Ok(*self.cursor.lock().unwrap())
    }

    fn monitors(&self) -> Result<Vec<MonitorArea>, AppError> {
        Ok(vec![MonitorArea {
            work_area: Rect { x: 0, y: 0, width: 1000, height: 800 },
            is_primary: true,
        }])
    }
}

/// 统计粘贴按键注入次数
#[derive(Clone, Default)]
pub struct CountingInjector {
    pastes: Arc<AtomicUsize>,
}

impl CountingInjector {
    pub fn count(&self) -> usize {
        self.pastes.load(Ordering::SeqCst)
    }
}

impl KeystrokeInjector for CountingInjector {
    fn paste(&self) -> Result<(), AppError> {
        self.pastes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 一套可在测试中观察的假端口
#[derive(Clone, Default)]
pub struct Harness {
    pub backend: MemoryBackend,
    pub clipboard: FakeClipboard,
    pub shortcuts: FakeShortcuts,
    pub surface: FakeSurface,
    pub injector: CountingInjector,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ports(&self) -> AgentPorts {
        AgentPorts {
            clipboard: Box::new(self.clipboard.clone()),
            shortcuts: Box::new(self.shortcuts.clone()),
            surface: Box::new(self.surface.clone()),
            injector: Arc::new(self.injector.clone()),
        }
    }

    /// 基于共享的内存后端启动一个代理；多次调用相当于"重启"
    pub fn start(&self, config: AgentConfig) -> AgentCore {
        AgentCore::start(config, self.backend.clone(), self.ports(), EventBus::new())
    }
}
