//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，代理核心、持久化层与各平台端口
//! 全部返回 `Result<T, AppError>`，调用方只需处理一种错误类型。
//!
//! 按错误处理分类：
//! - `Persistence` / `Database` / `Io` / `Serialization`：写盘失败，内存值仍然生效
//! - `HotkeyRejected` / `InvalidAccelerator`：快捷键被系统拒绝或格式非法，走回滚
//! - `Clipboard`：剪贴板读写失败，轮询下一拍重试
//! - `Input`：粘贴按键注入失败，仅记录日志
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `serde_json` / `io` 错误提供 `From` 转换，`?` 直接传播；
//!   数据库错误在调用点附带上下文后再映射。
//! - 实现 `Serialize` 将错误序列化为字符串，满足 IPC 传输要求。

use serde::Serialize;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 持久化写入未完成（内存状态仍然有效）
    #[error("持久化失败: {0}")]
    Persistence(String),

    /// SQLite 操作失败
    #[error("数据库错误: {0}")]
    Database(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 编解码失败
    #[error("序列化失败: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 剪贴板读写操作失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 快捷键格式不合法（在注册到系统之前即被拒绝）
    #[error("快捷键格式不合法 '{accelerator}': {reason}")]
    InvalidAccelerator { accelerator: String, reason: String },

    /// 系统拒绝注册快捷键（已被占用等）
    #[error("快捷键注册失败 '{accelerator}': {reason}")]
    HotkeyRejected { accelerator: String, reason: String },

    /// 窗口操作失败
    #[error("窗口操作失败: {0}")]
    Window(String),

    /// 输入模拟失败
    #[error("输入模拟失败: {0}")]
    Input(String),

    /// 代理主循环已退出，命令无法投递
    #[error("代理已停止，命令未送达")]
    ChannelClosed,
}

impl AppError {
    /// 被拒绝的快捷键字符串（仅快捷键相关错误返回 `Some`）
    pub fn rejected_accelerator(&self) -> Option<&str> {
        match self {
            AppError::InvalidAccelerator { accelerator, .. }
            | AppError::HotkeyRejected { accelerator, .. } => Some(accelerator),
            _ => None,
        }
    }
}

/// IPC 要求返回值实现 `Serialize`。
/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_accelerator_is_exposed_for_hotkey_errors() {
        let err = AppError::HotkeyRejected {
            accelerator: "Alt+F4".to_string(),
            reason: "already registered".to_string(),
        };
        assert_eq!(err.rejected_accelerator(), Some("Alt+F4"));
        assert!(err.to_string().contains("Alt+F4"));

        let err = AppError::Clipboard("busy".to_string());
        assert_eq!(err.rejected_accelerator(), None);
    }

    #[test]
    fn serializes_as_plain_message() {
        let err = AppError::Window("gone".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"窗口操作失败: gone\"");
    }
}
