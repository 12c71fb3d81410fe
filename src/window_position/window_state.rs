//! 窗口可见性状态
//!
//! 快捷面板只有两个状态：`Hidden` 与 `Visible`，初始为 `Hidden`。
//!
//! | 当前 | 事件 | 结果 |
//! |------|------|------|
//! | Hidden | 快捷键 / toggle | Visible（先定位再显示） |
//! | Visible | 快捷键 / toggle | Hidden（不改几何） |
//! | Visible | 失焦 | Hidden（调试模式下保持） |
//! | Visible | hide-window / 粘贴 | Hidden |

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowState {
    #[default]
    Hidden,
    Visible,
}

impl WindowState {
    pub fn is_visible(self) -> bool {
        self == WindowState::Visible
    }
}

/// 窗口状态机对一次 toggle 的决策
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleAction {
    Show,
    Hide,
}

pub fn toggle_action(state: WindowState) -> ToggleAction {
    match state {
        WindowState::Hidden => ToggleAction::Show,
        WindowState::Visible => ToggleAction::Hide,
    }
}
