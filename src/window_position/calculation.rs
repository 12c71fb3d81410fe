//! 窗口位置计算模块
//!
//! 单个工作区内的几何算法，两种摆放方式：
//!
//! 1. **跟随光标** (`follow_cursor_origin`)：
//!    窗口左上角对齐光标，再收敛到光标所在显示器的工作区内。
//!
//! 2. **默认位置** (`default_bounds`)：
//!    没有保存过窗口外框时使用，主显示器水平居中、纵向四分之一处。
//!
//! # 设计思路
//!
//! - 算法纯函数化：输入为光标、窗口尺寸、工作区，输出唯一坐标，便于测试。
//! - 先算理想位置，再做边界收敛。
//! - 收敛顺序固定为先右/下、后左/上：窗口比工作区还大时左上角优先可见。

use crate::models::WindowBounds;

use super::{Point, Rect, Size};

/// 将窗口原点收敛到工作区内
///
/// # 收敛规则
/// - 右边越界 → 贴右边；下边越界 → 贴下边
/// - 之后左边越界 → 贴左边；上边越界 → 贴上边
///
/// 窗口大于工作区时，后两步覆盖前两步，结果是工作区左上角。
///
/// # 后置条件
/// - `result.x >= area.x`，`result.y >= area.y`
/// - 若窗口可容纳：`result.x + width <= area.right()`，`result.y + height <= area.bottom()`
pub fn clamp_to_work_area(origin: Point, window_size: Size, area: Rect) -> Point {
    let width = window_size.width as i32;
    let height = window_size.height as i32;

    let mut x = origin.x;
    let mut y = origin.y;

    if x.saturating_add(width) > area.right() {
        x = area.right() - width;
    }
    if y.saturating_add(height) > area.bottom() {
        y = area.bottom() - height;
    }
    if x < area.x {
        x = area.x;
    }
    if y < area.y {
        y = area.y;
    }

    Point::new(x, y)
}

/// 跟随光标模式下的窗口原点
///
/// 窗口左上角对齐光标，再收敛到工作区内。
pub fn follow_cursor_origin(cursor: Point, window_size: Size, area: Rect) -> Point {
    clamp_to_work_area(cursor, window_size, area)
}

/// 默认窗口外框：主显示器水平居中，顶部位于工作区高度的四分之一
pub fn default_bounds(window_size: Size, primary: Rect) -> WindowBounds {
    let spare_width = (primary.width as i32 - window_size.width as i32).max(0);

    WindowBounds {
        x: primary.x + spare_width / 2,
        y: primary.y + primary.height as i32 / 4,
        width: window_size.width,
        height: window_size.height,
    }
}
