//! 窗口定位模块（快捷面板的显示/隐藏/摆放）
//!
//! 该模块负责以下核心能力：
//! - 按光标所在显示器计算窗口位置（跟随光标模式）
//! - 恢复用户最后一次拖动/缩放的窗口外框（固定位置模式）
//! - 保证窗口不会超出显示器工作区
//! - 维护 Hidden / Visible 状态机，处理快捷键切换与失焦隐藏
//! - 区分"用户移动窗口"与"代理自己摆放窗口"，只持久化前者
//!
//! # 设计思路
//!
//! 1. **职责拆分**：将"取光标""算位置""选显示器""状态机"拆为独立子模块，
//!    由本文件作为编排入口，降低耦合，便于单元测试。
//! 2. **端口隔离**：窗口与显示器操作经由 [`Surface`] trait 完成，
//!    桌面壳层提供真实实现，测试使用记录调用顺序的假实现。
//! 3. **失败可回退**：光标读取失败时回退到主显示器中心；显示器列表为空时直接使用光标坐标。
//!
//! # 实现思路
//!
//! - `cursor`：光标读取的重试与回退。
//! - `calculation`：单个工作区内的几何计算，保证窗口完全在边界内。
//! - `monitor`：先判定光标属于哪块屏（未命中取最近），再交给 `calculation`。
//! - `window_state`：可见性状态机。
//! - [`WindowPositioner`] 只做流程编排：读取上下文 -> 计算位置 -> 执行窗口操作。
//!
//! # 坐标系统说明
//!
//! 所有坐标均为全局物理像素、左上角原点、Y 轴向下。
//! 平台坐标系差异由 `Surface` 实现方吸收。

pub mod calculation;
pub mod cursor;
pub mod monitor;
pub mod window_state;

pub use monitor::MonitorArea;
pub use window_state::WindowState;

use crate::error::AppError;
use crate::models::WindowBounds;

use window_state::{ToggleAction, toggle_action};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// 全局坐标系中的矩形
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// 右边界（不含）
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// 下边界（不含）
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }
}

impl WindowBounds {
    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// 窗口几何变化的来源事件
///
/// 平台通常把一次 `set_bounds` 拆成"改尺寸"与"改位置"两步，各自产生事件，
/// 中间态的外框一半是旧值一半是新值，因此回声判断要按事件类型只比较对应分量。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundsChange {
    Moved,
    Resized,
}

/// 快捷面板窗口端口
///
/// 方法全部是同步、耗时有界的系统调用。
pub trait Surface: Send {
    /// 窗口外框尺寸（含边框）
    fn outer_size(&self) -> Result<Size, AppError>;

    fn set_position(&mut self, origin: Point) -> Result<(), AppError>;

    fn set_bounds(&mut self, bounds: WindowBounds) -> Result<(), AppError>;

    fn show(&mut self) -> Result<(), AppError>;

    fn hide(&mut self) -> Result<(), AppError>;

    fn focus(&mut self) -> Result<(), AppError>;

    /// 临时置于所有工作区（含全屏应用）之上
    fn set_visible_on_all_workspaces(&mut self, visible: bool) -> Result<(), AppError>;

    /// 全局光标位置
    fn cursor_position(&self) -> Result<Point, AppError>;

    /// 全部显示器的工作区
    fn monitors(&self) -> Result<Vec<MonitorArea>, AppError>;
}

/// 无界面运行时的占位窗口：只记录日志，不读取光标
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    bounds: Option<WindowBounds>,
}

impl Surface for HeadlessSurface {
    fn outer_size(&self) -> Result<Size, AppError> {
        let (width, height) = crate::config::DEFAULT_WINDOW_SIZE;
        Ok(self.bounds.map(|b| b.size()).unwrap_or(Size::new(width, height)))
    }

    fn set_position(&mut self, origin: Point) -> Result<(), AppError> {
        let size = self.outer_size()?;
        self.bounds = Some(WindowBounds::from_parts(origin, size));
        Ok(())
    }

    fn set_bounds(&mut self, bounds: WindowBounds) -> Result<(), AppError> {
        self.bounds = Some(bounds);
        Ok(())
    }

    fn show(&mut self) -> Result<(), AppError> {
        log::info!("(无界面) 面板显示于 {:?}", self.bounds);
        Ok(())
    }

    fn hide(&mut self) -> Result<(), AppError> {
        log::info!("(无界面) 面板隐藏");
        Ok(())
    }

    fn focus(&mut self) -> Result<(), AppError> {
        Ok(())
    }

    fn set_visible_on_all_workspaces(&mut self, _visible: bool) -> Result<(), AppError> {
        Ok(())
    }

    fn cursor_position(&self) -> Result<Point, AppError> {
        Err(AppError::Window("无界面模式不支持读取光标".to_string()))
    }

    fn monitors(&self) -> Result<Vec<MonitorArea>, AppError> {
        Ok(Vec::new())
    }
}

/// 快捷面板的显示状态机与摆放逻辑
pub struct WindowPositioner {
    surface: Box<dyn Surface>,
    state: WindowState,
    default_size: Size,
    /// 代理最近一次自己设置的外框；移动事件原点相同、缩放事件尺寸相同即为回声
    placed: Option<WindowBounds>,
}

impl WindowPositioner {
    pub fn new(surface: Box<dyn Surface>, default_size: Size) -> Self {
        Self {
            surface,
            state: WindowState::Hidden,
            default_size,
            placed: None,
        }
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    /// 快捷键 / toggle：隐藏则显示，显示则隐藏
    pub async fn toggle(
        &mut self,
        follow_cursor: bool,
        saved_bounds: Option<WindowBounds>,
    ) -> Result<WindowState, AppError> {
        match toggle_action(self.state) {
            ToggleAction::Show => self.show(follow_cursor, saved_bounds).await?,
            ToggleAction::Hide => self.hide()?,
        }
        Ok(self.state)
    }

    /// 定位并显示窗口
    ///
    /// 1. 跟随光标：取光标所在显示器工作区，窗口左上角对齐光标后收敛
    /// 2. 固定位置：原样恢复保存的外框；没有保存过则使用默认位置
    /// 3. 临时置顶到所有工作区 -> 显示 -> 聚焦 -> 撤销置顶
    pub async fn show(
        &mut self,
        follow_cursor: bool,
        saved_bounds: Option<WindowBounds>,
    ) -> Result<(), AppError> {
        if follow_cursor {
            let size = self.surface.outer_size()?;
            let origin = self.follow_cursor_target(size).await;
            self.surface.set_position(origin)?;
            self.placed = Some(WindowBounds::from_parts(origin, size));
            log::debug!("窗口跟随光标定位到 ({}, {})", origin.x, origin.y);
        } else {
            let bounds = match saved_bounds {
                Some(bounds) => bounds,
                None => self.default_bounds(),
            };
            self.surface.set_bounds(bounds)?;
            self.placed = Some(bounds);
            log::debug!("窗口恢复到保存的位置 {:?}", bounds);
        }

        self.raise_and_show()?;
        self.state = WindowState::Visible;
        Ok(())
    }

    /// 隐藏窗口，不改变几何
    pub fn hide(&mut self) -> Result<(), AppError> {
        self.surface.hide()?;
        self.state = WindowState::Hidden;
        Ok(())
    }

    /// 窗口失去焦点；返回是否因此隐藏
    pub fn on_blur(&mut self, hide_on_blur: bool) -> Result<bool, AppError> {
        if !self.state.is_visible() || !hide_on_blur {
            return Ok(false);
        }
        self.hide()?;
        Ok(true)
    }

    /// 窗口被移动或缩放；返回需要持久化的外框
    ///
    /// 只在可见状态下记录用户操作，代理自己摆放窗口引起的事件被忽略。
    /// 第一次真正的用户操作之后不再做回声判断。
    pub fn on_bounds_changed(
        &mut self,
        change: BoundsChange,
        bounds: WindowBounds,
    ) -> Option<WindowBounds> {
        if !self.state.is_visible() {
            return None;
        }
        let echo = self.placed.is_some_and(|placed| match change {
            BoundsChange::Moved => placed.origin() == bounds.origin(),
            BoundsChange::Resized => placed.size() == bounds.size(),
        });
        if echo {
            return None;
        }
        self.placed = None;
        Some(bounds)
    }

    async fn follow_cursor_target(&mut self, size: Size) -> Point {
        let monitors = self.surface.monitors().unwrap_or_else(|e| {
            log::warn!("获取显示器列表失败: {}", e);
            Vec::new()
        });
        let primary_area = monitor::primary_monitor(&monitors).map(|m| m.work_area);

        let cursor = cursor::cursor_position_with_retry(self.surface.as_mut(), primary_area).await;

        match monitor::monitor_for_point(cursor, &monitors) {
            Some(target) => calculation::follow_cursor_origin(cursor, size, target.work_area),
            None => {
                log::warn!("没有可用的显示器，窗口直接放在光标处");
                cursor
            }
        }
    }

    fn default_bounds(&self) -> WindowBounds {
        let monitors = self.surface.monitors().unwrap_or_default();
        match monitor::primary_monitor(&monitors) {
            Some(primary) => calculation::default_bounds(self.default_size, primary.work_area),
            None => WindowBounds::from_parts(Point::default(), self.default_size),
        }
    }

    fn raise_and_show(&mut self) -> Result<(), AppError> {
        if let Err(e) = self.surface.set_visible_on_all_workspaces(true) {
            log::debug!("临时置顶失败: {}", e);
        }

        let shown = self.surface.show().and_then(|()| {
            if let Err(e) = self.surface.focus() {
                log::warn!("窗口聚焦失败: {}", e);
            }
            Ok(())
        });

        if let Err(e) = self.surface.set_visible_on_all_workspaces(false) {
            log::debug!("撤销置顶失败: {}", e);
        }

        shown
    }
}
