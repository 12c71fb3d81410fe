//! 剪贴板模块
//!
//! # 设计思路
//!
//! - **端口**：`SystemClipboard` 只暴露纯文本读写，代理核心不感知平台细节，
//!   测试用内存实现替换。
//! - **监控**：`watcher` 以固定间隔轮询，和 `lastObservedText` 比较得出外部变化；
//!   代理自身写入剪贴板时同步刷新 `lastObservedText`，避免被当成新历史再次捕获。
//! - **容错**：读取失败只影响当前一拍，下一拍自动重试。
//!
//! # 实现思路
//!
//! - `ArboardClipboard` 延迟创建 `arboard::Clipboard`，创建或读写失败后丢弃实例，
//!   下次调用重新创建（对应显示服务器重启、剪贴板被占用等瞬时故障）。
//! - "剪贴板里没有文本"不是错误，返回 `Ok(None)`。

pub mod watcher;

pub use watcher::ClipboardWatcher;

use crate::error::AppError;

/// 系统剪贴板（纯文本）
pub trait SystemClipboard: Send {
    /// 读取当前文本；剪贴板中没有文本时返回 `Ok(None)`
    fn read_text(&mut self) -> Result<Option<String>, AppError>;

    fn write_text(&mut self, text: &str) -> Result<(), AppError>;
}

/// 基于 `arboard` 的系统剪贴板
#[derive(Default)]
pub struct ArboardClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ArboardClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn clipboard(&mut self) -> Result<&mut arboard::Clipboard, AppError> {
        if self.inner.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| AppError::Clipboard(format!("打开剪贴板失败: {}", e)))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| AppError::Clipboard("剪贴板不可用".to_string()))
    }
}

impl SystemClipboard for ArboardClipboard {
    fn read_text(&mut self) -> Result<Option<String>, AppError> {
        let read = self.clipboard()?.get_text();
        match read {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => {
                self.inner = None;
                Err(AppError::Clipboard(format!("读取剪贴板失败: {}", err)))
            }
        }
    }

    fn write_text(&mut self, text: &str) -> Result<(), AppError> {
        let result = self.clipboard()?.set_text(text.to_string());
        result.map_err(|err| {
            self.inner = None;
            AppError::Clipboard(format!("写入剪贴板失败: {}", err))
        })
    }
}
