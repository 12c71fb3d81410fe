//! 多显示器支持模块
//!
//! 在多屏环境中判断光标位于哪块显示器，为跟随光标模式选出收敛用的工作区。
//!
//! # 设计思路
//!
//! - 将"显示器选择"与"位置计算"拆分，保证函数职责单一。
//! - 光标不在任何显示器内（显示器热插拔瞬间、坐标缝隙）时选最近的显示器，
//!   而不是固定回退到第一块屏。
//!
//! # 实现思路
//!
//! - 采用左闭右开区间判断边界，避免双屏交界点重复命中。
//! - 最近显示器按"点到矩形的距离平方"比较，使用 `i64` 避免溢出。

use super::{Point, Rect};

/// 一块显示器的工作区（去掉任务栏/菜单栏后的可用区域）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorArea {
    pub work_area: Rect,
    pub is_primary: bool,
}

/// 判断点是否在矩形内
///
/// 使用左闭右开区间 `[left, right)` × `[top, bottom)`，
/// 保证相邻显示器交界处不会重复命中。
pub fn is_point_in_area(point: Point, area: Rect) -> bool {
    let x_in_bounds = point.x >= area.x && point.x < area.right();
    let y_in_bounds = point.y >= area.y && point.y < area.bottom();
    x_in_bounds && y_in_bounds
}

/// 返回第一个包含该点的显示器索引
pub fn find_monitor_index(point: Point, monitors: &[MonitorArea]) -> Option<usize> {
    monitors
        .iter()
        .position(|m| is_point_in_area(point, m.work_area))
}

fn distance_sq(point: Point, area: Rect) -> i64 {
    let px = i64::from(point.x);
    let py = i64::from(point.y);
    let left = i64::from(area.x);
    let top = i64::from(area.y);
    let right = i64::from(area.right());
    let bottom = i64::from(area.bottom());

    let dx = if px < left {
        left - px
    } else if px >= right {
        px - right + 1
    } else {
        0
    };
    let dy = if py < top {
        top - py
    } else if py >= bottom {
        py - bottom + 1
    } else {
        0
    };

    dx * dx + dy * dy
}

/// 距离该点最近的显示器索引
pub fn nearest_monitor_index(point: Point, monitors: &[MonitorArea]) -> Option<usize> {
    monitors
        .iter()
        .enumerate()
        .min_by_key(|(_, m)| distance_sq(point, m.work_area))
        .map(|(index, _)| index)
}

/// 选择光标所在显示器；未命中时选最近的一块
///
/// - `Some(&MonitorArea)`：命中或最近的显示器
/// - `None`：`monitors` 为空
pub fn monitor_for_point(point: Point, monitors: &[MonitorArea]) -> Option<&MonitorArea> {
    let index = find_monitor_index(point, monitors).or_else(|| {
        log::debug!("光标 ({}, {}) 不在任何显示器内，改用最近的显示器", point.x, point.y);
        nearest_monitor_index(point, monitors)
    })?;
    monitors.get(index)
}

/// 主显示器；没有标记主屏时取第一块
pub fn primary_monitor(monitors: &[MonitorArea]) -> Option<&MonitorArea> {
    monitors
        .iter()
        .find(|m| m.is_primary)
        .or_else(|| monitors.first())
}
