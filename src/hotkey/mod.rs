//! 全局快捷键模块
//!
//! - `accelerator`：快捷键字符串的语法校验与规范化
//! - `registrar`：单槽位注册器，负责"试注册 → 提交或回滚"
//!
//! 系统侧注册通过 [`ShortcutBackend`] 端口完成，桌面壳层提供实现，
//! 测试用假后端模拟"系统拒绝某个组合"。

pub mod accelerator;
pub mod registrar;

pub use accelerator::{Accelerator, Modifier};
pub use registrar::HotkeyRegistrar;

/// 系统全局快捷键端口
///
/// 实现方在快捷键触发时应把事件投递回代理主循环（见 `AgentHandle`），
/// 不得在回调里直接修改代理状态。
pub trait ShortcutBackend: Send {
    /// 注册快捷键；系统拒绝时返回原因
    fn register(&mut self, accelerator: &Accelerator) -> Result<(), String>;

    /// 注销本进程注册的全部快捷键
    fn unregister_all(&mut self) -> Result<(), String>;
}

/// 未接入桌面壳层时使用：拒绝一切注册，代理以无快捷键状态运行
#[derive(Debug, Default)]
pub struct DisabledShortcuts;

impl ShortcutBackend for DisabledShortcuts {
    fn register(&mut self, _accelerator: &Accelerator) -> Result<(), String> {
        Err("当前运行模式不支持全局快捷键".to_string())
    }

    fn unregister_all(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// 平台默认快捷键
pub fn default_accelerator() -> &'static str {
    if cfg!(target_os = "macos") {
        "Command+Shift+V"
    } else {
        "Control+Shift+V"
    }
}
